//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The default virtual disk size in GiB for a new VM.
pub const DEFAULT_DISK_SIZE_GB: u32 = 60;

/// The default amount of RAM in GiB for a new VM.
pub const DEFAULT_MEMORY_GB: u32 = 8;

/// The default number of virtual processors for a new VM.
pub const DEFAULT_CPU_CORES: u32 = 4;

/// The default network switch a new VM is connected to.
pub const DEFAULT_NETWORK_SWITCH: &str = "Default Switch";

/// The default guest account name.
pub const DEFAULT_USERNAME: &str = "GPUVM";

/// Sentinel GPU name meaning "pick the first partitionable adapter".
pub const AUTO_GPU_NAME: &str = "AUTO";

/// The default share of the GPU assigned to the partition, in percent.
pub const DEFAULT_GPU_ALLOCATION_PERCENT: u32 = 50;

/// The smallest amount of RAM in GiB a VM can be created with.
pub const MIN_MEMORY_GB: u32 = 2;

/// The smallest virtual disk size in GiB a VM can be created with.
pub const MIN_DISK_SIZE_GB: u32 = 20;

/// The smallest amount of RAM in MiB a VM can be reconfigured to.
pub const MIN_UPDATE_MEMORY_MB: u64 = 1024;

/// The longest VM name the hypervisor tooling accepts.
pub const MAX_VM_NAME_LEN: usize = 100;
