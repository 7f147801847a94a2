//! Conversions between SDK models and generated proto types.

use time::OffsetDateTime;

use crate::errors::ContractError;
use crate::models::{Contract, ContractQuota, ResultCode};
use crate::proto::common::{Code, Error as ProtoError};
use crate::proto::contract as pb;

const NANOS_PER_SECOND: i128 = 1_000_000_000;

impl ResultCode {
    /// Decode a raw wire value; unknown values map to `Unknown`.
    #[must_use]
    pub fn from_wire(value: i32) -> Self {
        Code::try_from(value).map_or(Self::Unknown, Self::from)
    }

    /// Encode as a raw wire value.
    #[must_use]
    pub fn to_wire(self) -> i32 {
        Code::from(self) as i32
    }
}

impl From<Code> for ResultCode {
    fn from(code: Code) -> Self {
        match code {
            Code::OkUnspecified => Self::Ok,
            Code::Cancelled => Self::Cancelled,
            Code::Unknown => Self::Unknown,
            Code::InvalidArgument => Self::InvalidArgument,
            Code::DeadlineExceeded => Self::DeadlineExceeded,
            Code::NotFound => Self::NotFound,
            Code::AlreadyExists => Self::AlreadyExists,
            Code::PermissionDenied => Self::PermissionDenied,
            Code::ResourceExhausted => Self::ResourceExhausted,
            Code::FailedPrecondition => Self::FailedPrecondition,
            Code::Aborted => Self::Aborted,
            Code::OutOfRange => Self::OutOfRange,
            Code::Unimplemented => Self::Unimplemented,
            Code::Internal => Self::Internal,
            Code::Unavailable => Self::Unavailable,
            Code::DataLoss => Self::DataLoss,
            Code::Unauthenticated => Self::Unauthenticated,
        }
    }
}

impl From<ResultCode> for Code {
    fn from(code: ResultCode) -> Self {
        match code {
            ResultCode::Ok => Self::OkUnspecified,
            ResultCode::Cancelled => Self::Cancelled,
            ResultCode::Unknown => Self::Unknown,
            ResultCode::InvalidArgument => Self::InvalidArgument,
            ResultCode::DeadlineExceeded => Self::DeadlineExceeded,
            ResultCode::NotFound => Self::NotFound,
            ResultCode::AlreadyExists => Self::AlreadyExists,
            ResultCode::PermissionDenied => Self::PermissionDenied,
            ResultCode::ResourceExhausted => Self::ResourceExhausted,
            ResultCode::FailedPrecondition => Self::FailedPrecondition,
            ResultCode::Aborted => Self::Aborted,
            ResultCode::OutOfRange => Self::OutOfRange,
            ResultCode::Unimplemented => Self::Unimplemented,
            ResultCode::Internal => Self::Internal,
            ResultCode::Unavailable => Self::Unavailable,
            ResultCode::DataLoss => Self::DataLoss,
            ResultCode::Unauthenticated => Self::Unauthenticated,
        }
    }
}

impl From<tonic::Code> for ResultCode {
    fn from(code: tonic::Code) -> Self {
        Self::from_wire(code as i32)
    }
}

impl From<&ContractError> for ProtoError {
    fn from(err: &ContractError) -> Self {
        Self {
            msg: err.to_string(),
        }
    }
}

impl From<pb::ContractQuota> for ContractQuota {
    fn from(q: pb::ContractQuota) -> Self {
        Self {
            cpu: q.cpu,
            memory: q.memory,
            block: q.block,
            block_ssd: q.block_ssd,
            fs: q.fs,
            fs_ssd: q.fs_ssd,
        }
    }
}

impl From<ContractQuota> for pb::ContractQuota {
    fn from(q: ContractQuota) -> Self {
        Self {
            cpu: q.cpu,
            memory: q.memory,
            block: q.block,
            block_ssd: q.block_ssd,
            fs: q.fs,
            fs_ssd: q.fs_ssd,
        }
    }
}

/// Encode a timestamp as `google.protobuf.Timestamp`.
#[must_use]
pub fn to_proto_timestamp(ts: OffsetDateTime) -> prost_types::Timestamp {
    prost_types::Timestamp {
        seconds: ts.unix_timestamp(),
        nanos: i32::try_from(ts.nanosecond()).unwrap_or_default(),
    }
}

/// Decode a `google.protobuf.Timestamp`.
///
/// # Errors
/// Returns [`ContractError::Transport`] if the timestamp is out of range.
pub fn from_proto_timestamp(ts: &prost_types::Timestamp) -> Result<OffsetDateTime, ContractError> {
    let nanos = i128::from(ts.seconds) * NANOS_PER_SECOND + i128::from(ts.nanos);
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .map_err(|e| ContractError::malformed(format!("invalid last_updated_ts: {e}")))
}

impl From<Contract> for pb::Contract {
    fn from(c: Contract) -> Self {
        Self {
            contractor_name: c.contractor_name,
            contract_id: c.id,
            quota: Some(c.quota.into()),
            available_services: c.available_services,
            csp_id: c.csp_id,
            last_updated_ts: Some(to_proto_timestamp(c.last_updated_ts)),
        }
    }
}

impl TryFrom<pb::Contract> for Contract {
    type Error = ContractError;

    fn try_from(c: pb::Contract) -> Result<Self, Self::Error> {
        let last_updated_ts = c
            .last_updated_ts
            .as_ref()
            .ok_or_else(|| ContractError::malformed("missing last_updated_ts"))
            .and_then(from_proto_timestamp)?;

        Ok(Self {
            id: c.contract_id,
            contractor_name: c.contractor_name,
            csp_id: c.csp_id,
            available_services: c.available_services,
            quota: c.quota.map(Into::into).unwrap_or_default(),
            last_updated_ts,
        })
    }
}
