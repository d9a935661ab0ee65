//! External CPI client
//!
//! Speaks the external CPI protocol: one JSON request on stdin, one JSON
//! response on stdout, per process invocation.

use crate::error::{OpenStackError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use validator_cloud::{Cpi, CpiError};
use validator_config::CpiSettings;

/// Error types the CPI raises for cloud-side failures
const CLOUD_ERROR_TYPES: [&str; 5] = [
    "Bosh::Clouds::CloudError",
    "Bosh::Clouds::VMNotFound",
    "Bosh::Clouds::VMCreationFailed",
    "Bosh::Clouds::DiskNotFound",
    "Bosh::Clouds::NoDiskSpace",
];

#[derive(Debug, Serialize)]
struct CpiRequest<'a> {
    method: &'a str,
    arguments: Vec<Value>,
    context: CpiContext<'a>,
}

#[derive(Debug, Serialize)]
struct CpiContext<'a> {
    director_uuid: &'a str,
}

#[derive(Debug, Deserialize)]
struct CpiResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<CpiResponseError>,
    #[serde(default)]
    log: String,
}

#[derive(Debug, Deserialize)]
struct CpiResponseError {
    #[serde(rename = "type")]
    error_type: String,
    message: String,
    #[serde(default)]
    ok_to_retry: bool,
}

/// CPI binary invoked once per call
pub struct ExternalCpi {
    bin: PathBuf,
    args: Vec<String>,
    director_uuid: String,
}

impl ExternalCpi {
    pub fn new(bin: impl Into<PathBuf>, director_uuid: impl Into<String>) -> Self {
        Self {
            bin: bin.into(),
            args: Vec::new(),
            director_uuid: director_uuid.into(),
        }
    }

    pub fn from_settings(settings: &CpiSettings) -> Result<Self> {
        let bin = settings
            .bin
            .clone()
            .ok_or_else(|| OpenStackError::CpiNotConfigured("cpi.bin is not set".to_string()))?;
        let director_uuid = settings
            .director_uuid
            .clone()
            .unwrap_or_else(|| "validator".to_string());
        Ok(Self::new(bin, director_uuid))
    }

    /// Extra arguments passed to the CPI binary on every call
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Invoke `method` and return its result
    pub async fn call(&self, method: &str, arguments: Vec<Value>) -> std::result::Result<Value, CpiError> {
        let request = build_request(method, arguments, &self.director_uuid)?;

        tracing::debug!("CPI request: {}", request);

        let mut child = Command::new(&self.bin)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                CpiError::Invocation(format!("failed to start {}: {}", self.bin.display(), e))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(request.as_bytes()).await?;
            // closing stdin signals the end of the request
            drop(stdin);
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(CpiError::Invocation(format!(
                "{} exited with {}: {}",
                self.bin.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        parse_response(method, &String::from_utf8_lossy(&output.stdout))
    }
}

fn build_request(
    method: &str,
    arguments: Vec<Value>,
    director_uuid: &str,
) -> std::result::Result<String, CpiError> {
    let request = CpiRequest {
        method,
        arguments,
        context: CpiContext { director_uuid },
    };
    Ok(serde_json::to_string(&request)?)
}

fn parse_response(method: &str, stdout: &str) -> std::result::Result<Value, CpiError> {
    let response: CpiResponse = serde_json::from_str(stdout.trim())?;

    if !response.log.is_empty() {
        tracing::debug!("CPI {} log:\n{}", method, response.log);
    }

    match response.error {
        None => Ok(response.result),
        Some(error) if CLOUD_ERROR_TYPES.contains(&error.error_type.as_str()) => {
            tracing::debug!(
                "CPI {} failed with {} (ok_to_retry: {})",
                method,
                error.error_type,
                error.ok_to_retry
            );
            Err(CpiError::Cloud {
                message: error.message,
            })
        }
        Some(error) => Err(CpiError::Other {
            error_type: error.error_type,
            message: error.message,
        }),
    }
}

#[async_trait]
impl Cpi for ExternalCpi {
    async fn delete_vm(&self, vm_cid: &str) -> std::result::Result<(), CpiError> {
        self.call("delete_vm", vec![Value::from(vm_cid)]).await?;
        Ok(())
    }

    async fn delete_stemcell(&self, stemcell_cid: &str) -> std::result::Result<(), CpiError> {
        self.call("delete_stemcell", vec![Value::from(stemcell_cid)])
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_request() {
        let request = build_request("delete_vm", vec![Value::from("vm-1")], "uuid-1").unwrap();
        let value: Value = serde_json::from_str(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "method": "delete_vm",
                "arguments": ["vm-1"],
                "context": {"director_uuid": "uuid-1"}
            })
        );
    }

    #[test]
    fn test_parse_success() {
        let result = parse_response("delete_vm", r#"{"result": null, "error": null, "log": ""}"#);
        assert_eq!(result.unwrap(), Value::Null);
    }

    #[test]
    fn test_parse_cloud_error() {
        let stdout = r#"{
            "result": null,
            "error": {"type": "Bosh::Clouds::VMNotFound", "message": "VM `vm-1' not found", "ok_to_retry": false},
            "log": "deleting vm-1"
        }"#;
        match parse_response("delete_vm", stdout) {
            Err(CpiError::Cloud { message }) => assert_eq!(message, "VM `vm-1' not found"),
            other => panic!("Expected cloud error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_other_error() {
        let stdout = r#"{"result": null, "error": {"type": "Bosh::Clouds::NotImplemented", "message": "nope", "ok_to_retry": false}, "log": ""}"#;
        let err = parse_response("delete_stemcell", stdout).unwrap_err();
        assert!(!err.is_cloud_error());
        assert!(matches!(err, CpiError::Other { ref error_type, .. } if error_type == "Bosh::Clouds::NotImplemented"));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(parse_response("delete_vm", "oops"), Err(CpiError::Json(_))));
    }

    #[test]
    fn test_from_settings_requires_bin() {
        assert!(matches!(
            ExternalCpi::from_settings(&CpiSettings::default()),
            Err(OpenStackError::CpiNotConfigured(_))
        ));

        let cpi = ExternalCpi::from_settings(&CpiSettings {
            bin: Some(PathBuf::from("/var/vcap/jobs/openstack_cpi/bin/cpi")),
            director_uuid: None,
        })
        .unwrap();
        assert_eq!(cpi.director_uuid, "validator");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_call_through_process() {
        let cpi = ExternalCpi::new("/bin/sh", "uuid-1").with_args([
            "-c",
            r#"read request; case "$request" in *delete_vm*vm-2*) echo '{"result":null,"error":{"type":"Bosh::Clouds::CloudError","message":"busy","ok_to_retry":true},"log":""}';; *) echo '{"result":null,"error":null,"log":""}';; esac"#,
        ]);

        assert!(cpi.delete_vm("vm-1").await.is_ok());
        assert!(matches!(
            cpi.delete_vm("vm-2").await,
            Err(CpiError::Cloud { ref message }) if message == "busy"
        ));
        assert!(cpi.delete_stemcell("stem-1 light").await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let cpi = ExternalCpi::new("/nonexistent/cpi", "uuid-1");
        assert!(matches!(
            cpi.delete_vm("vm-1").await,
            Err(CpiError::Invocation(_))
        ));
    }
}
