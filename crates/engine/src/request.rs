//! Server-mode fetch protocol and request supersession.
//!
//! Every query change issues a new request with a larger sequence number.
//! Only a response to the most recently issued request is applied; older
//! responses and errors are dropped whenever they arrive.

use serde::{Deserialize, Serialize};

use datagrid_core::Record;

use crate::filter::ServerQuery;
use crate::sort::SortEntry;

/// What the host must fetch. `seq` is echoed back in `complete_fetch`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchRequest {
    pub seq: u64,
    pub page: usize,
    pub page_size: usize,
    pub sort: Vec<SortEntry>,
    pub filters: ServerQuery,
}

impl FetchRequest {
    pub fn query_key(&self) -> QueryKey {
        QueryKey {
            page: self.page,
            page_size: self.page_size,
            sort: self.sort.clone(),
            filters: self.filters.clone(),
        }
    }
}

/// Everything that identifies a server result set, minus the sequence
/// number. Two requests with equal keys are refreshes of the same data.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryKey {
    pub page: usize,
    pub page_size: usize,
    pub sort: Vec<SortEntry>,
    pub filters: ServerQuery,
}

/// One page of server data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResponse {
    pub rows: Vec<Record>,
    pub total_count: usize,
}

impl FetchResponse {
    pub fn new(rows: Vec<Record>, total_count: usize) -> Self {
        Self { rows, total_count }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RequestTracker {
    last_seq: u64,
    in_flight: Option<FetchRequest>,
    applied: Option<QueryKey>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a request, superseding any request still in flight.
    pub fn issue(&mut self, page: usize, page_size: usize, sort: Vec<SortEntry>, filters: ServerQuery) -> FetchRequest {
        self.last_seq += 1;
        let request = FetchRequest {
            seq: self.last_seq,
            page,
            page_size,
            sort,
            filters,
        };
        if let Some(prev) = self.in_flight.replace(request.clone()) {
            log::debug!("fetch #{} superseded by #{}", prev.seq, request.seq);
        }
        request
    }

    pub fn last_seq(&self) -> u64 {
        self.last_seq
    }

    pub fn in_flight(&self) -> Option<&FetchRequest> {
        self.in_flight.as_ref()
    }

    pub fn is_current(&self, seq: u64) -> bool {
        self.in_flight.as_ref().is_some_and(|r| r.seq == seq)
    }

    /// Take the in-flight request if `seq` names it. `None` means the
    /// response is stale (or a duplicate) and must be discarded.
    pub fn resolve(&mut self, seq: u64) -> Option<FetchRequest> {
        if self.is_current(seq) {
            self.in_flight.take()
        } else {
            None
        }
    }

    /// The query whose rows are currently displayed.
    pub fn applied(&self) -> Option<&QueryKey> {
        self.applied.as_ref()
    }

    /// Record the query of an applied response. Returns true if it differs
    /// from the previously displayed one, i.e. the source changed.
    pub fn mark_applied(&mut self, key: QueryKey) -> bool {
        let changed = self.applied.as_ref() != Some(&key);
        self.applied = Some(key);
        changed
    }
}
