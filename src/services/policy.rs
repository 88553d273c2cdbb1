//! Access policy
//!
//! A pure decision table from (caller, operation, target) to allow/deny. It
//! reads nothing but its arguments, so services can evaluate it inside a
//! transaction against the same state the mutation will be applied to.

use crate::{
    error::{AppError, AppResult},
    models::identity::{Caller, CallerIdentity},
};

/// Every operation the ledger exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    RegisterUser,
    GetAllUsers,
    CallerStatus,
    AddBook,
    UpdateBook,
    GetAllBooks,
    IsBookAvailable,
    GetBookDetails,
    BorrowBook,
    ReturnBook,
    GetUserBorrowings,
    ReadEvents,
    LedgerSummary,
}

/// Who may invoke an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Anyone, identified or not
    Open,
    /// Any caller with a resolvable identity
    Identified,
    /// Registered members only
    Registered,
    /// The administrator only
    Admin,
}

impl Operation {
    pub fn access(self) -> Access {
        match self {
            Operation::AddBook | Operation::UpdateBook => Access::Admin,
            Operation::BorrowBook | Operation::ReturnBook | Operation::GetUserBorrowings => {
                Access::Registered
            }
            Operation::RegisterUser | Operation::CallerStatus => Access::Identified,
            // Member enumeration is open to every caller; see DESIGN.md
            Operation::GetAllUsers
            | Operation::GetAllBooks
            | Operation::IsBookAvailable
            | Operation::GetBookDetails
            | Operation::ReadEvents
            | Operation::LedgerSummary => Access::Open,
        }
    }

    /// Operations whose target member must be the caller
    pub fn is_self_scoped(self) -> bool {
        matches!(
            self,
            Operation::RegisterUser | Operation::GetUserBorrowings | Operation::CallerStatus
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Operation::RegisterUser => "registerUser",
            Operation::GetAllUsers => "getAllUsers",
            Operation::CallerStatus => "callerStatus",
            Operation::AddBook => "addBook",
            Operation::UpdateBook => "updateBook",
            Operation::GetAllBooks => "getAllBooks",
            Operation::IsBookAvailable => "isBookAvailable",
            Operation::GetBookDetails => "getBookDetails",
            Operation::BorrowBook => "borrowBook",
            Operation::ReturnBook => "returnBook",
            Operation::GetUserBorrowings => "getUserBorrowings",
            Operation::ReadEvents => "readEvents",
            Operation::LedgerSummary => "ledgerSummary",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Unauthenticated,
    AdminRequired,
    RegistrationRequired,
    NotSelf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        self == Decision::Allow
    }

    /// Turn a denial into the matching typed error
    pub fn into_result(self, operation: Operation) -> AppResult<()> {
        let reason = match self {
            Decision::Allow => return Ok(()),
            Decision::Deny(reason) => reason,
        };
        tracing::debug!(operation = operation.name(), ?reason, "Request denied by access policy");

        Err(match reason {
            DenyReason::Unauthenticated => AppError::Unauthenticated(format!(
                "{} requires a caller identity",
                operation.name()
            )),
            DenyReason::AdminRequired => AppError::PermissionDenied(format!(
                "{} requires administrator privileges",
                operation.name()
            )),
            DenyReason::RegistrationRequired => AppError::PermissionDenied(format!(
                "{} requires a registered member",
                operation.name()
            )),
            DenyReason::NotSelf => AppError::PermissionDenied(format!(
                "{} is restricted to the caller's own records",
                operation.name()
            )),
        })
    }
}

/// Decide whether `caller` may perform `operation` on `target`.
///
/// `target` names the member an operation acts on, when it acts on one.
pub fn check(caller: Option<&Caller>, operation: Operation, target: Option<&CallerIdentity>) -> Decision {
    let access = operation.access();
    let caller = match caller {
        Some(caller) => caller,
        None if access == Access::Open => return Decision::Allow,
        None => return Decision::Deny(DenyReason::Unauthenticated),
    };

    if operation.is_self_scoped() && target.is_some_and(|t| *t != caller.identity) {
        return Decision::Deny(DenyReason::NotSelf);
    }

    match access {
        Access::Open | Access::Identified => Decision::Allow,
        Access::Registered if caller.registered => Decision::Allow,
        Access::Registered => Decision::Deny(DenyReason::RegistrationRequired),
        Access::Admin if caller.admin => Decision::Allow,
        Access::Admin => Decision::Deny(DenyReason::AdminRequired),
    }
}
