//! Plain-text tables and report blocks for terminal output.

use chrono::{DateTime, Utc};
use nc_02_reconciliation_store::ReconciliationRecord;
use nc_03_ledger_client::TransactionDetails;
use nc_04_sync_orchestrator::{ComplaintOutcome, SyncReport};
use shared_types::{ComplaintRecord, ContractHandle};
use std::fmt::{self, Write as _};

/// Boxed table with a header row.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Table with the given headers.
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a row. Missing cells render empty.
    pub fn row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }

    /// True when no rows were added.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                let content = self
                    .rows
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0);
                header.chars().count().max(content) + 2
            })
            .collect()
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.widths();
        let separator: String = widths.iter().fold(String::from("+"), |mut line, w| {
            line.push_str(&"-".repeat(*w));
            line.push('+');
            line
        });
        let line = |cells: &[String]| -> String {
            widths.iter().enumerate().fold(String::from("|"), |mut out, (i, w)| {
                let cell = cells.get(i).map_or("", String::as_str);
                let _ = write!(out, " {cell:<width$}|", width = w - 1);
                out
            })
        };

        writeln!(f, "{separator}")?;
        writeln!(f, "{}", line(&self.headers))?;
        writeln!(f, "{separator}")?;
        for row in &self.rows {
            writeln!(f, "{}", line(row))?;
        }
        write!(f, "{separator}")
    }
}

/// Local-independent timestamp format.
pub fn timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn or_unset(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("Not provided")
}

fn outcome_detail(outcome: &ComplaintOutcome) -> String {
    match (&outcome.transaction_hash, &outcome.message) {
        (_, Some(message)) => message.clone(),
        (Some(tx), None) => tx.to_string(),
        (None, None) => String::new(),
    }
}

fn outcome_table(outcomes: &[ComplaintOutcome]) -> Table {
    let mut table = Table::new(["Complaint ID", "Fingerprint", "Outcome", "Detail"]);
    for outcome in outcomes {
        table.row([
            outcome.complaint_id.clone(),
            outcome
                .fingerprint
                .map_or_else(|| "-".to_string(), |fp| fp.short()),
            outcome.kind.to_string(),
            outcome_detail(outcome),
        ]);
    }
    table
}

/// Pass report: per-phase tables followed by the counts.
pub fn sync_report(report: &SyncReport) -> String {
    let mut out = String::new();
    if let (Some(contract), Some(signer)) = (report.contract, report.signer) {
        let _ = writeln!(out, "Contract: {contract}");
        let _ = writeln!(out, "Signer:   {signer}");
    }
    if !report.submissions.is_empty() {
        let _ = writeln!(out, "\nSubmissions\n{}", outcome_table(&report.submissions));
    }
    if !report.verifications.is_empty() {
        let _ = writeln!(out, "\nVerification\n{}", outcome_table(&report.verifications));
    }

    let summary = report.summary();
    let _ = writeln!(out, "\nSummary");
    let _ = writeln!(out, "  success:             {}", summary.success);
    let _ = writeln!(out, "  already processed:   {}", summary.already_processed);
    let _ = writeln!(out, "  failed:              {}", summary.failed);
    let _ = writeln!(out, "  verified:            {}", summary.verified);
    let _ = writeln!(out, "  verification failed: {}", summary.verification_failed);
    let _ = write!(out, "  verification error:  {}", summary.verification_error);
    out
}

/// Record listing.
pub fn records(records: &[ReconciliationRecord]) -> Table {
    let mut table = Table::new([
        "Complaint ID",
        "Complainant",
        "Stored",
        "Location",
        "IPC Sections",
        "Status",
    ]);
    for record in records {
        let data = &record.complaint_data;
        let sections = data.legal_sections().join(", ");
        table.row([
            record.complaint_id.clone(),
            data.complainant_name.clone().unwrap_or_else(|| "Unknown".into()),
            timestamp(&record.timestamp),
            data.incident_details
                .as_ref()
                .and_then(|d| d.location.clone())
                .unwrap_or_else(|| "Not specified".into()),
            if sections.is_empty() { "None".into() } else { sections },
            record.status.to_string(),
        ]);
    }
    table
}

/// Contract listing.
pub fn contracts(handles: &[ContractHandle]) -> Table {
    let mut table = Table::new(["Contract Address", "Deployed", "Deployed By", "Status"]);
    for handle in handles {
        table.row([
            handle.address.to_string(),
            timestamp(&handle.deployed_at),
            handle.deployed_by.clone(),
            if handle.is_active { "active" } else { "inactive" }.to_string(),
        ]);
    }
    table
}

/// Complaint detail block: record fields, then the complaint snapshot.
pub fn record_detail(record: &ReconciliationRecord, on_chain: Option<bool>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Complaint ID:     {}", record.complaint_id);
    let _ = writeln!(out, "Stored:           {}", timestamp(&record.timestamp));
    let _ = writeln!(out, "Status:           {}", record.status);
    let _ = writeln!(out, "Fingerprint:      {}", record.fingerprint);
    let _ = writeln!(out, "Contract:         {}", record.contract_address);
    let _ = writeln!(
        out,
        "Transaction:      {}",
        record.transaction_hash.as_ref().map_or("-", |tx| tx.as_str())
    );
    let _ = writeln!(out, "Wallet:           {}", record.wallet_used);
    if let Some(error) = &record.error_message {
        let _ = writeln!(out, "Last error:       {error}");
    }
    let verified = match on_chain {
        Some(true) => "yes",
        Some(false) => "no",
        None => "unknown",
    };
    let _ = writeln!(out, "Verified on chain: {verified}");
    out.push_str(&complaint_detail(&record.complaint_data));
    out
}

fn complaint_detail(complaint: &ComplaintRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\nComplaint");
    let _ = writeln!(out, "  Text:        {}", complaint.text);
    let _ = writeln!(out, "  Complainant: {}", or_unset(complaint.complainant_name.as_deref()));
    let _ = writeln!(out, "  Phone:       {}", or_unset(complaint.complainant_phone.as_deref()));
    let _ = writeln!(out, "  Filed:       {}", or_unset(complaint.filed_at.as_deref()));

    if let Some(incident) = &complaint.incident_details {
        let _ = writeln!(out, "\nIncident");
        let _ = writeln!(out, "  Date:        {}", or_unset(incident.date.as_deref()));
        let _ = writeln!(out, "  Location:    {}", or_unset(incident.location.as_deref()));
        let _ = writeln!(out, "  Category:    {}", or_unset(incident.category.as_deref()));
    }
    if let Some(filed_by) = &complaint.filed_by {
        let _ = writeln!(out, "\nFiled by");
        let _ = writeln!(out, "  ID:          {}", or_unset(filed_by.id.as_deref()));
        let _ = writeln!(out, "  Name:        {}", or_unset(filed_by.name.as_deref()));
        let _ = writeln!(out, "  Role:        {}", or_unset(filed_by.role.as_deref()));
    }
    if !complaint.legal_sections().is_empty() {
        let _ = writeln!(out, "\nLegal sections: {}", complaint.legal_sections().join(", "));
    }
    if let Some(analysis) = &complaint.analysis_result {
        let cognizable = match analysis.is_cognizable {
            Some(true) => "yes",
            Some(false) => "no",
            None => "unknown",
        };
        let _ = writeln!(out, "\nAnalysis");
        let _ = writeln!(out, "  Cognizable:  {cognizable}");
        let _ = writeln!(out, "  Summary:     {}", or_unset(analysis.summary.as_deref()));
        let _ = writeln!(out, "  Explanation: {}", or_unset(analysis.explanation.as_deref()));
        for (i, section) in analysis.sections.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}: {}", i + 1, section.section, section.description);
        }
    }
    out
}

/// Transaction block for the complaint detail view.
pub fn transaction(details: &TransactionDetails) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\nTransaction");
    let _ = writeln!(out, "  Hash:        {}", details.hash);
    let _ = writeln!(
        out,
        "  Block:       {}",
        details.block_number.map_or_else(|| "pending".to_string(), |b| b.to_string())
    );
    let _ = writeln!(out, "  Gas limit:   {}", details.gas_limit);
    if let Some(used) = details.gas_used {
        let _ = writeln!(out, "  Gas used:    {used}");
    }
    if let Some(ok) = details.succeeded {
        let _ = writeln!(out, "  Status:      {}", if ok { "success" } else { "failed" });
    }
    out
}
