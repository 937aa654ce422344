use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum PortcullisError {
    #[error("Config error: {0}")]
    #[diagnostic(code(portcullis::config))]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(portcullis::serde))]
    Serde(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    #[diagnostic(code(portcullis::db))]
    Db(#[from] sea_orm::DbErr),

    #[error("Unknown role id: {0}")]
    #[diagnostic(code(portcullis::unknown_role))]
    RoleNotFound(i64),

    #[error("Unknown template: {0}")]
    #[diagnostic(
        code(portcullis::unknown_template),
        help("Run the `templates` subcommand to list the registered templates")
    )]
    TemplateNotFound(String),

    #[error("{0}")]
    #[diagnostic(code(portcullis::other))]
    Other(String),
}
