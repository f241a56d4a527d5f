use std::fmt;

#[derive(Debug, Clone)]
pub enum IpLocationError {
    Config(String),
    CacheConnection(String),
    CacheOperation(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    ConnectionUnavailable(String),
    Validation(String),
    Serialization(String),
}

impl IpLocationError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            IpLocationError::Config(_) => "E001",
            IpLocationError::CacheConnection(_) => "E002",
            IpLocationError::CacheOperation(_) => "E003",
            IpLocationError::DatabaseConnection(_) => "E004",
            IpLocationError::DatabaseOperation(_) => "E005",
            IpLocationError::ConnectionUnavailable(_) => "E006",
            IpLocationError::Validation(_) => "E007",
            IpLocationError::Serialization(_) => "E008",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            IpLocationError::Config(_) => "Configuration Error",
            IpLocationError::CacheConnection(_) => "Cache Connection Error",
            IpLocationError::CacheOperation(_) => "Cache Operation Error",
            IpLocationError::DatabaseConnection(_) => "Database Connection Error",
            IpLocationError::DatabaseOperation(_) => "Database Operation Error",
            IpLocationError::ConnectionUnavailable(_) => "Connection Unavailable",
            IpLocationError::Validation(_) => "Validation Error",
            IpLocationError::Serialization(_) => "Serialization Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            IpLocationError::Config(msg) => msg,
            IpLocationError::CacheConnection(msg) => msg,
            IpLocationError::CacheOperation(msg) => msg,
            IpLocationError::DatabaseConnection(msg) => msg,
            IpLocationError::DatabaseOperation(msg) => msg,
            IpLocationError::ConnectionUnavailable(msg) => msg,
            IpLocationError::Validation(msg) => msg,
            IpLocationError::Serialization(msg) => msg,
        }
    }
}

impl fmt::Display for IpLocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_type(), self.message())
    }
}

impl std::error::Error for IpLocationError {}

// 便捷的构造函数
impl IpLocationError {
    pub fn config<T: Into<String>>(msg: T) -> Self {
        IpLocationError::Config(msg.into())
    }

    pub fn cache_connection<T: Into<String>>(msg: T) -> Self {
        IpLocationError::CacheConnection(msg.into())
    }

    pub fn cache_operation<T: Into<String>>(msg: T) -> Self {
        IpLocationError::CacheOperation(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        IpLocationError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        IpLocationError::DatabaseOperation(msg.into())
    }

    pub fn connection_unavailable<T: Into<String>>(msg: T) -> Self {
        IpLocationError::ConnectionUnavailable(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        IpLocationError::Validation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        IpLocationError::Serialization(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for IpLocationError {
    fn from(err: sea_orm::DbErr) -> Self {
        IpLocationError::DatabaseOperation(err.to_string())
    }
}

impl From<redis::RedisError> for IpLocationError {
    fn from(err: redis::RedisError) -> Self {
        IpLocationError::CacheOperation(err.to_string())
    }
}

impl From<serde_json::Error> for IpLocationError {
    fn from(err: serde_json::Error) -> Self {
        IpLocationError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, IpLocationError>;
