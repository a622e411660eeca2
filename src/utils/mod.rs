pub mod error;
pub mod validation;
pub mod formats;
pub mod fs;

pub use error::{ConversionError, ConverterError, ConverterResult, PathError, ValidationError};
pub use validation::{validate_options, validate_output_directory, validate_quality, validate_worklist};
pub use formats::{DecoderKind, detect_format};
pub use fs::{
    extract_filename,
    file_size,
    resolve_output_path,
    write_atomically,
};
