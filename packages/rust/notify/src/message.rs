//! Message templates.

use jobwatch_shared::{JobRecord, JobWatchError};

/// Alert text for a newly seen posting.
pub fn format_alert(job: &JobRecord) -> String {
    format!(
        "New Job Alert\n\n\
         Title: {}\n\
         Department Name: {}\n\
         Last Date: {}\n\
         PDF Link: {}\n",
        job.title,
        job.department_name,
        job.last_date,
        job.encoded_document_link()
    )
}

/// Notice sent when a run aborts before any posting was processed.
pub fn format_failure(err: &JobWatchError) -> String {
    format!("Job alert run failed: {err}")
}
