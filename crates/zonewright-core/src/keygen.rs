// ── DKIM key generation ──
//
// New key pairs come from an external tool. `OpensslKeyGenerator` drives
// the `openssl` binary; tests plug in their own `KeyGenerator`.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

use secrecy::SecretString;
use tracing::info;

use crate::exec::{ExecError, check_output};
use crate::fs;

/// A freshly generated RSA key pair, PEM encoded.
#[derive(Debug, Clone)]
pub struct KeyPair {
    pub private_pem: SecretString,
    pub public_pem: String,
}

pub trait KeyGenerator {
    /// Generate a key pair, leaving the PEM files at the given paths.
    fn generate(
        &self,
        private_path: &Path,
        public_path: &Path,
        bits: u32,
    ) -> Result<KeyPair, ExecError>;
}

#[derive(Debug, Clone)]
pub struct OpensslKeyGenerator {
    program: PathBuf,
}

impl Default for OpensslKeyGenerator {
    fn default() -> Self {
        Self {
            program: PathBuf::from("openssl"),
        }
    }
}

impl OpensslKeyGenerator {
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn openssl(&self, args: &[&OsStr]) -> Result<(), ExecError> {
        let rendered = format!(
            "{} {}",
            self.program.display(),
            args.iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );
        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|source| ExecError::Spawn {
                command: rendered.clone(),
                source,
            })?;
        check_output(&rendered, &output).map(drop)
    }
}

fn read(path: &Path) -> Result<String, ExecError> {
    std::fs::read_to_string(path).map_err(|source| ExecError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn chmod(path: &Path, mode: u32) -> Result<(), ExecError> {
    fs::set_mode(path, mode).map_err(|source| ExecError::Io {
        path: path.to_path_buf(),
        source,
    })
}

impl KeyGenerator for OpensslKeyGenerator {
    fn generate(
        &self,
        private_path: &Path,
        public_path: &Path,
        bits: u32,
    ) -> Result<KeyPair, ExecError> {
        let bits = bits.to_string();
        self.openssl(&[
            OsStr::new("genrsa"),
            OsStr::new("-out"),
            private_path.as_os_str(),
            OsStr::new(&bits),
        ])?;
        chmod(private_path, fs::PRIVATE_KEY_MODE)?;

        self.openssl(&[
            OsStr::new("rsa"),
            OsStr::new("-in"),
            private_path.as_os_str(),
            OsStr::new("-pubout"),
            OsStr::new("-outform"),
            OsStr::new("pem"),
            OsStr::new("-out"),
            public_path.as_os_str(),
        ])?;
        chmod(public_path, fs::PUBLIC_KEY_MODE)?;

        info!(path = %private_path.display(), bits = %bits, "generated DKIM key pair");
        Ok(KeyPair {
            private_pem: SecretString::from(read(private_path)?),
            public_pem: read(public_path)?,
        })
    }
}
