//! The temporary on-disk copy of the CA certificate.

use std::{
    io::{self, Write},
    path::Path,
};

use log::{debug, trace};
use tempfile::NamedTempFile;

use crate::constants::{CA_CERT_FILE_PREFIX, CA_CERT_FILE_SUFFIX};


//------------ ScopedCaCertFile ----------------------------------------------

/// The CA certificate written to a temporary file.
///
/// The file exists for as long as the value does. It is removed when the
/// value is dropped, whichever way the owning scope is left.
#[derive(Debug)]
pub struct ScopedCaCertFile {
    file: NamedTempFile,
}

impl ScopedCaCertFile {
    /// Writes the PEM content to a new temporary file.
    pub fn create(pem: &str) -> Result<Self, io::Error> {
        let mut file = tempfile::Builder::new()
            .prefix(CA_CERT_FILE_PREFIX)
            .suffix(CA_CERT_FILE_SUFFIX)
            .tempfile()?;

        file.write_all(pem.as_bytes())?;
        if !pem.ends_with('\n') {
            file.write_all(b"\n")?;
        }
        file.flush()?;

        debug!("Wrote CA certificate to {}", file.path().display());
        Ok(ScopedCaCertFile { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Removes the file now and reports any error doing so.
    ///
    /// Dropping the value removes the file too, but ignores errors.
    pub fn close(self) -> Result<(), io::Error> {
        trace!("Removing CA certificate file {}", self.file.path().display());
        self.file.close()
    }
}


//------------ Tests ---------------------------------------------------------
