use crate::Config;
use color_eyre::Result;
use eyre::Context as _;
use reqwest::Certificate;
use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
};

const CERTIFICATE_EXTENSIONS: [&str; 2] = ["pem", "crt"];

impl Config {
    /// Builds the HTTP client shared by every agent client of a cycle.
    ///
    /// The configured timeout bounds each individual request. With SSL enabled
    /// the CA bundle file and every certificate in the bundle directory are
    /// added as trust roots.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder().timeout(self.timeout()?);

        if self.enable_ssl {
            if self.trust_server_certificate {
                warn!("Server certificate verification is disabled");
                builder = builder.danger_accept_invalid_certs(true);
            }
            for path in self.ca_bundle_paths()? {
                for certificate in read_certificates(&path)? {
                    builder = builder.add_root_certificate(certificate);
                }
            }
        }

        builder.build().wrap_err("Failed to build HTTP client")
    }

    fn ca_bundle_paths(&self) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        if let Some(file) = &self.ca_bundle_file {
            paths.push(file.clone());
        }
        if let Some(dir) = &self.ca_bundle_dir {
            let entries =
                fs::read_dir(dir).wrap_err_with(|| format!("Failed to read CA bundle directory {:?}", dir))?;
            for entry in entries {
                let path = entry?.path();
                if is_certificate(&path) {
                    paths.push(path);
                }
            }
        }
        paths.sort();
        Ok(paths)
    }
}

fn is_certificate(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| CERTIFICATE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

fn read_certificates(path: &Path) -> Result<Vec<Certificate>> {
    let pem = fs::read(path).wrap_err_with(|| format!("Failed to read certificate {:?}", path))?;
    let certificates =
        Certificate::from_pem_bundle(&pem).wrap_err_with(|| format!("Failed to parse certificate {:?}", path))?;
    debug!(path = %path.display(), count = certificates.len(), "Loaded CA certificates");
    Ok(certificates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use temp_dir::TempDir;

    #[test]
    fn bundle_directory_only_picks_certificate_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.child("b.pem"), "").unwrap();
        fs::write(dir.child("a.CRT"), "").unwrap();
        fs::write(dir.child("notes.txt"), "").unwrap();

        let config = Config {
            enable_ssl: true,
            ca_bundle_dir: Some(dir.path().to_path_buf()),
            ..Config::default()
        };

        let paths = config.ca_bundle_paths().unwrap();
        assert_eq!(paths, vec![dir.child("a.CRT"), dir.child("b.pem")]);
    }

    #[test]
    fn plain_http_client_builds() {
        assert!(Config::default().http_client().is_ok());
    }

    #[test]
    fn unreadable_bundle_fails() {
        let config = Config {
            enable_ssl: true,
            ca_bundle_file: Some(PathBuf::from("/nonexistent/ca.pem")),
            ..Config::default()
        };
        assert!(config.http_client().is_err());
    }
}
