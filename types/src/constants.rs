/// Maximum length of a future id.
pub const MAX_FUTURE_ID_LENGTH: usize = 1024;

/// Maximum length of names (contracts, functions, events, strategies).
pub const MAX_NAME_LENGTH: usize = 256;

/// Maximum length of hex-encoded hashes and addresses.
pub const MAX_HEX_STRING_LENGTH: usize = 130;

/// Maximum length of free-form strings (revert reasons, string arguments).
pub const MAX_STRING_LENGTH: usize = 16 * 1024;

/// Maximum length of calldata, return data and byte arguments.
pub const MAX_DATA_LENGTH: usize = 512 * 1024;

/// Maximum number of dependencies of a single future.
pub const MAX_DEPENDENCIES: usize = 4096;

/// Maximum number of linked libraries of a deployment.
pub const MAX_LIBRARIES: usize = 256;

/// Maximum number of arguments (and array elements) in a call.
pub const MAX_ARGUMENTS: usize = 1024;

/// Maximum nesting of array arguments.
pub const MAX_VALUE_DEPTH: usize = 16;

/// Maximum number of transaction attempts on one network interaction.
pub const MAX_TRANSACTIONS: usize = 1024;

/// Maximum number of logs in a receipt.
pub const MAX_LOGS: usize = 1024;

/// Maximum number of topics in a log.
pub const MAX_TOPICS: usize = 4;

/// Maximum number of network interactions of a single future.
pub const MAX_NETWORK_INTERACTIONS: usize = 1024;

/// Maximum number of execution states in an encoded deployment.
pub const MAX_EXECUTION_STATES: usize = 1 << 16;
