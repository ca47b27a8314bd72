use anyhow::{bail, Result};
use std::fmt;
use std::path::Path;

use crate::error::FatalError;
use crate::runner::CommandRunner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Amazon,
    RedHat,
    Debian,
    Ubuntu14,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageType {
    Rpm,
    Deb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    X86_64,
    I386,
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Family::Amazon => write!(f, "amazon"),
            Family::RedHat => write!(f, "redhat"),
            Family::Debian => write!(f, "debian"),
            Family::Ubuntu14 => write!(f, "ubuntu14"),
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arch::X86_64 => write!(f, "x86_64"),
            Arch::I386 => write!(f, "i386"),
        }
    }
}

/// Host classification, computed once per run and passed explicitly into
/// every adapter.
#[derive(Debug, Clone, Copy)]
pub struct OsClassification {
    pub family: Family,
    pub package_type: PackageType,
    pub arch: Arch,
}

/// Release marker files, checked in order. The first one that exists decides
/// the classification; later markers are never consulted.
const MARKERS: [&str; 4] = [
    "etc/system-release",
    "etc/redhat-release",
    "etc/lsb-release",
    "etc/debian_version",
];

pub fn classify(runner: &dyn CommandRunner, host_root: &Path) -> Result<OsClassification> {
    let (family, package_type) = classify_family(host_root)?;

    let uname = runner
        .run("uname", &["-m"])
        .map_err(|_| FatalError::UnsupportedOs("could not determine machine architecture".into()))?;
    let arch = normalize_arch(&uname.stdout);

    Ok(OsClassification {
        family,
        package_type,
        arch,
    })
}

fn classify_family(host_root: &Path) -> Result<(Family, PackageType)> {
    for marker in &MARKERS {
        let path = host_root.join(marker);
        if !path.is_file() {
            continue;
        }
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        return classify_marker(marker, &content);
    }

    bail!(FatalError::UnsupportedOs(
        "no release marker file found".into()
    ))
}

fn classify_marker(marker: &str, content: &str) -> Result<(Family, PackageType)> {
    match marker {
        "etc/system-release" | "etc/redhat-release" => {
            if content.contains("Amazon") {
                Ok((Family::Amazon, PackageType::Rpm))
            } else if content.contains("Red Hat") {
                Ok((Family::RedHat, PackageType::Rpm))
            } else {
                bail!(FatalError::UnsupportedOs(format!(
                    "unrecognized release string in /{}",
                    marker
                )))
            }
        }
        "etc/lsb-release" => {
            if content.contains("Ubuntu 14") {
                Ok((Family::Ubuntu14, PackageType::Deb))
            } else {
                bail!(FatalError::UnsupportedOs(
                    "unrecognized Ubuntu release".into()
                ))
            }
        }
        "etc/debian_version" => {
            let major = content.trim().split('.').next().unwrap_or("");
            if major == "8" {
                Ok((Family::Debian, PackageType::Deb))
            } else {
                bail!(FatalError::UnsupportedOs(format!(
                    "unsupported Debian version {}",
                    content.trim()
                )))
            }
        }
        _ => unreachable!("marker list and match arms must stay in sync"),
    }
}

/// Coarse normalization: x86_64/amd64 are 64-bit, everything else (ARM
/// included) is reported as i386.
pub fn normalize_arch(raw: &str) -> Arch {
    match raw.trim() {
        "x86_64" | "amd64" => Arch::X86_64,
        _ => Arch::I386,
    }
}
