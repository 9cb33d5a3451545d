use std::fmt::{Display, Formatter};

pub type BridgeResult<T> = Result<T, BridgeError>;

/// Error kinds of the oracle bridge, mapped to process exit codes and to the
/// failure-attribution classes used in test reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BridgeErrorCategory {
    RequestConstruction,
    MissingDeclaration,
    OracleUnavailable,
    OracleProcess,
    Protocol,
    CacheAlreadyPopulated,
    CacheMiss,
    SchemaViolation,
    IoSystem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorAttribution {
    Usage,
    Infrastructure,
    Framework,
    Data,
}

impl ErrorAttribution {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Usage => "usage",
            Self::Infrastructure => "infrastructure",
            Self::Framework => "framework",
            Self::Data => "data",
        }
    }
}

impl BridgeErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::RequestConstruction | Self::MissingDeclaration => 2,
            Self::OracleUnavailable => 3,
            Self::OracleProcess | Self::Protocol => 4,
            Self::CacheAlreadyPopulated | Self::CacheMiss => 5,
            Self::SchemaViolation => 6,
            Self::IoSystem => 7,
        }
    }

    pub const fn kind_name(self) -> &'static str {
        match self {
            Self::RequestConstruction => "RequestConstruction",
            Self::MissingDeclaration => "MissingDeclaration",
            Self::OracleUnavailable => "OracleUnavailable",
            Self::OracleProcess => "OracleProcess",
            Self::Protocol => "Protocol",
            Self::CacheAlreadyPopulated => "CacheAlreadyPopulated",
            Self::CacheMiss => "CacheMiss",
            Self::SchemaViolation => "SchemaViolation",
            Self::IoSystem => "IoSystem",
        }
    }

    pub const fn attribution(self) -> ErrorAttribution {
        match self {
            Self::RequestConstruction | Self::MissingDeclaration => ErrorAttribution::Usage,
            Self::OracleUnavailable | Self::OracleProcess | Self::Protocol | Self::IoSystem => {
                ErrorAttribution::Infrastructure
            }
            Self::CacheAlreadyPopulated | Self::CacheMiss => ErrorAttribution::Framework,
            Self::SchemaViolation => ErrorAttribution::Data,
        }
    }

    pub const fn is_infrastructure(self) -> bool {
        matches!(self.attribution(), ErrorAttribution::Infrastructure)
    }
}

impl Display for BridgeErrorCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.kind_name())
    }
}

/// Structured bridge error: a category, a stable dotted placeholder code, and
/// a human-readable message. Never retried anywhere in the bridge.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{category} [{placeholder}] {message}")]
pub struct BridgeError {
    category: BridgeErrorCategory,
    placeholder: &'static str,
    message: String,
}

impl BridgeError {
    pub fn new(
        category: BridgeErrorCategory,
        placeholder: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            placeholder,
            message: message.into(),
        }
    }

    pub fn request_construction(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(BridgeErrorCategory::RequestConstruction, placeholder, message)
    }

    pub fn missing_declaration(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(BridgeErrorCategory::MissingDeclaration, placeholder, message)
    }

    pub fn oracle_unavailable(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(BridgeErrorCategory::OracleUnavailable, placeholder, message)
    }

    pub fn oracle_process(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(BridgeErrorCategory::OracleProcess, placeholder, message)
    }

    pub fn protocol(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(BridgeErrorCategory::Protocol, placeholder, message)
    }

    pub fn cache_already_populated(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(
            BridgeErrorCategory::CacheAlreadyPopulated,
            placeholder,
            message,
        )
    }

    pub fn cache_miss(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(BridgeErrorCategory::CacheMiss, placeholder, message)
    }

    pub fn schema_violation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(BridgeErrorCategory::SchemaViolation, placeholder, message)
    }

    pub fn io_system(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(BridgeErrorCategory::IoSystem, placeholder, message)
    }

    pub const fn category(&self) -> BridgeErrorCategory {
        self.category
    }

    pub const fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub const fn attribution(&self) -> ErrorAttribution {
        self.category.attribution()
    }

    /// Prefix the message with retrieval-site context, keeping category and
    /// placeholder intact.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self {
            category: self.category,
            placeholder: self.placeholder,
            message: format!("{}: {}", context.into(), self.message),
        }
    }

    pub fn diagnostic_line(&self) -> String {
        format!("ERROR: [{}] {}", self.placeholder, self.message)
    }

    pub fn fatal_exit_line(&self) -> String {
        format!("FATAL EXIT CODE: {}", self.exit_code())
    }
}
