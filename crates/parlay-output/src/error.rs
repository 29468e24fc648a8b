use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Run already terminated: {run_id}")]
    AlreadyTerminated { run_id: String },

    #[error("No active run")]
    NoActiveRun,
}

pub type Result<T> = std::result::Result<T, OutputError>;
