use std::backtrace::Backtrace;
use std::fmt::Display;
use std::fmt::{self, Formatter};
use std::io;
use std::panic::Location;
use std::sync::PoisonError;

pub type PfResult<T> = Result<T, PfErr>;

#[derive(Debug)]
pub struct PfErr {
    pub kind: PfErrKind,
    pub backtrace: Option<Backtrace>,
}

/// Errors never reach a viewer as-is: [crate::Pf::open_folder] turns the
/// recoverable ones into an empty view. This text is what ends up in logs and
/// in the occasional status line of a photographer-facing client.
impl Display for PfErr {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl Display for PfErrKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PfErrKind::FetchFailed(msg) => write!(f, "Could not fetch from drive storage: {msg}"),
            PfErrKind::FolderNonexistent => write!(f, "That folder does not exist"),
            PfErrKind::RootNonexistent => {
                write!(f, "That folder is not part of any synced root")
            }
            PfErrKind::BlobCorrupted => write!(f, "The synced folder tree could not be read"),
            PfErrKind::InvalidPageSize => write!(f, "Items per page must be at least 1"),
            PfErrKind::DiskPathInvalid => write!(f, "That disk path is invalid"),
            PfErrKind::DiskPathTaken => write!(f, "That disk path is not available"),
            PfErrKind::Unexpected(msg) => write!(f, "Unexpected error: {msg}"),
        }
    }
}

impl From<PfErrKind> for PfErr {
    fn from(kind: PfErrKind) -> Self {
        Self { kind, backtrace: Some(Backtrace::force_capture()) }
    }
}

impl PfErr {
    /// Errors a viewer should see as "nothing here" rather than a failure.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.kind,
            PfErrKind::FetchFailed(_)
                | PfErrKind::FolderNonexistent
                | PfErrKind::RootNonexistent
                | PfErrKind::BlobCorrupted
        )
    }
}

pub trait Unexpected<T> {
    fn map_unexpected(self) -> PfResult<T>;
}

impl<T, E: std::fmt::Debug> Unexpected<T> for Result<T, E> {
    #[track_caller]
    fn map_unexpected(self) -> PfResult<T> {
        let location = Location::caller();
        self.map_err(|err| {
            PfErrKind::Unexpected(format!(
                "unexpected error at {}:{} {err:?}",
                location.file(),
                location.line(),
            ))
            .into()
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PfErrKind {
    /// The storage collaborator could not produce a tree blob or an image.
    FetchFailed(String),
    FolderNonexistent,
    /// The folder has no known owning root and is not a granted root itself.
    RootNonexistent,
    /// A blob decompressed or parsed into something other than a drive tree.
    BlobCorrupted,
    InvalidPageSize,
    DiskPathInvalid,
    DiskPathTaken,

    /// If no caller expects to handle a particular error, we debug format the
    /// underlying error to keep the number of error kinds in check. Commonly
    /// used for errors originating in other crates.
    Unexpected(String),
}

pub fn core_err_unexpected<T: fmt::Debug>(err: T) -> PfErrKind {
    PfErrKind::Unexpected(format!("{:?}", err))
}

impl<G> From<PoisonError<G>> for PfErr {
    fn from(err: PoisonError<G>) -> Self {
        core_err_unexpected(err).into()
    }
}

impl From<io::Error> for PfErr {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::NotFound
            | io::ErrorKind::PermissionDenied
            | io::ErrorKind::InvalidInput => PfErrKind::DiskPathInvalid,
            io::ErrorKind::AlreadyExists => PfErrKind::DiskPathTaken,
            _ => core_err_unexpected(e),
        }
        .into()
    }
}

impl From<serde_json::Error> for PfErr {
    fn from(err: serde_json::Error) -> Self {
        PfErrKind::Unexpected(format!("{err}")).into()
    }
}

impl From<reqwest::Error> for PfErr {
    fn from(err: reqwest::Error) -> Self {
        PfErrKind::FetchFailed(err.to_string()).into()
    }
}
