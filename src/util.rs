use std::fmt::Debug;
use std::fs;
use std::path::Path;

use log::{error, info};

pub fn log_error(name: &str, res: Result<(), impl Debug>) {
    if let Err(e) = res {
        error!("{} failed with error: {:?}", name, e)
    } else {
        info!("{} succeeded", name);
    }
}

/// Key bytes from `file` if given, otherwise the UTF-8 bytes of `literal`.
pub fn read_key(literal: Option<&str>, file: Option<&Path>) -> std::io::Result<Option<Vec<u8>>> {
    match (literal, file) {
        (_, Some(path)) => fs::read(path).map(Some),
        (Some(value), None) => Ok(Some(value.as_bytes().to_vec())),
        (None, None) => Ok(None),
    }
}
