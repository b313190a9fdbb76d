//! Hardware targets supported by the circuit compiler.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hardware families the circuit compiler can emit schematics for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum HardwareTarget {
    Asic,
    Fpga,
    Tpu,
    Qpu,
    Opu,
    Lpu,
    Gpu,
}

impl HardwareTarget {
    /// All supported targets, in CLI help order.
    pub const ALL: [HardwareTarget; 7] = [
        HardwareTarget::Asic,
        HardwareTarget::Fpga,
        HardwareTarget::Tpu,
        HardwareTarget::Qpu,
        HardwareTarget::Opu,
        HardwareTarget::Lpu,
        HardwareTarget::Gpu,
    ];

    /// Upper-case target name as used on the wire and in the CLI.
    pub fn as_str(&self) -> &'static str {
        match self {
            HardwareTarget::Asic => "ASIC",
            HardwareTarget::Fpga => "FPGA",
            HardwareTarget::Tpu => "TPU",
            HardwareTarget::Qpu => "QPU",
            HardwareTarget::Opu => "OPU",
            HardwareTarget::Lpu => "LPU",
            HardwareTarget::Gpu => "GPU",
        }
    }
}

impl fmt::Display for HardwareTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HardwareTarget {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ASIC" => Ok(HardwareTarget::Asic),
            "FPGA" => Ok(HardwareTarget::Fpga),
            "TPU" => Ok(HardwareTarget::Tpu),
            "QPU" => Ok(HardwareTarget::Qpu),
            "OPU" => Ok(HardwareTarget::Opu),
            "LPU" => Ok(HardwareTarget::Lpu),
            "GPU" => Ok(HardwareTarget::Gpu),
            other => Err(format!(
                "invalid target '{}' (valid: ASIC, FPGA, TPU, QPU, OPU, LPU, GPU)",
                other
            )),
        }
    }
}
