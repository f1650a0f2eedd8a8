pub mod disk_image;
pub mod format;
pub mod sample_file;
pub mod track_parser;
