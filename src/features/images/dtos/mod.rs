mod image_dto;

pub use image_dto::{
    DeleteImageResponseDto, ImageResponseDto, ImageUrlResponseDto, UpdateImageDescriptionDto,
    UploadImageDto,
};
