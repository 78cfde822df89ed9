use crate::error::LakerelayError;
use std::path::Path;

/// Print a JSON document to stdout.
pub fn print_result(json: &str) {
    println!("{}", json);
}

/// Print error to stderr in the contract format: error: <category>: <message>
pub fn print_error(err: &LakerelayError) {
    eprintln!("error: {}", err);
}

/// Write a JSON document to a file.
pub fn write_file(json: &str, path: &Path) -> Result<(), LakerelayError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        return Err(LakerelayError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("parent directory does not exist: {}", parent.display()),
        )));
    }
    std::fs::write(path, json)?;
    Ok(())
}
