pub mod captions_dto;
pub mod health_dto;
pub mod sources_dto;
