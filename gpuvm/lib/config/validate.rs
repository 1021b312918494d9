//! VM configuration validation.
//!
//! Validation is local and pre-flight: it never contacts the backend and never opens an
//! operation-log subscription. All violations are collected so the operator sees every problem
//! at once instead of fixing them one by one.

use crate::{GpuVmError, GpuVmResult};

use super::{
    VmConfig, VmUpdateConfig, MAX_VM_NAME_LEN, MIN_DISK_SIZE_GB, MIN_MEMORY_GB,
    MIN_UPDATE_MEMORY_MB,
};

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl VmConfig {
    /// Validates the configuration, collecting every violation.
    pub fn validate(&self) -> GpuVmResult<()> {
        let mut errors = Vec::new();

        validate_name(&self.name, &mut errors);

        if self.memory_gb < MIN_MEMORY_GB {
            errors.push(format!("Minimum memory is {} GB", MIN_MEMORY_GB));
        }
        if self.disk_size_gb < MIN_DISK_SIZE_GB {
            errors.push(format!("Minimum disk size is {} GB", MIN_DISK_SIZE_GB));
        }
        if self.cpu_cores == 0 {
            errors.push("At least one CPU core is required".to_string());
        }

        validate_gpu_allocation(self.gpu_allocation_percent, &mut errors);

        if self.iso_path.trim().is_empty() {
            errors.push("ISO path is required".to_string());
        }
        if self.vhd_path.trim().is_empty() {
            errors.push("VHD storage path is required".to_string());
        }
        if self.username.trim().is_empty() {
            errors.push("Guest username is required".to_string());
        }

        finish(errors)
    }
}

impl VmUpdateConfig {
    /// Validates the reconfiguration, collecting every violation.
    pub fn validate(&self) -> GpuVmResult<()> {
        let mut errors = Vec::new();

        validate_name(&self.name, &mut errors);

        if self.cpu_count == 0 {
            errors.push("At least one CPU core is required".to_string());
        }
        if self.memory_mb < MIN_UPDATE_MEMORY_MB {
            errors.push(format!("Minimum memory is {} MB", MIN_UPDATE_MEMORY_MB));
        }

        validate_gpu_allocation(self.gpu_allocation_percent, &mut errors);

        finish(errors)
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

fn validate_name(name: &str, errors: &mut Vec<String>) {
    if name.trim().is_empty() {
        errors.push("VM name is required".to_string());
    } else if name.len() > MAX_VM_NAME_LEN {
        errors.push(format!(
            "VM name must be at most {} characters",
            MAX_VM_NAME_LEN
        ));
    }
}

fn validate_gpu_allocation(percent: u32, errors: &mut Vec<String>) {
    if percent == 0 || percent > 100 {
        errors.push("GPU allocation must be between 1 and 100 percent".to_string());
    }
}

fn finish(errors: Vec<String>) -> GpuVmResult<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(GpuVmError::ConfigValidation(errors))
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
