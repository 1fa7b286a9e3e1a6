//! Rendering of the notification e-mails sent at each lifecycle step.
//!
//! Every value that originated from a requester is HTML-escaped before it is
//! interpolated.

use crate::{
  notify::Message,
  request::{Decision, Request, RequestId},
};

const NO_NOTES_SUMMARY: &str = "N/A";
const NO_NOTES_OUTCOME: &str = "No notes provided";
const SIGNATURE: &str = "MMC Wellness IT Team";

/// Absolute approve/reject URLs for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionLinks {
  pub approve: String,
  pub reject:  String,
}

impl ActionLinks {
  pub fn new(base_url: &str, id: RequestId) -> Self {
    let link = |decision: Decision| {
      format!(
        "{}/api/requests/{id}/{}",
        base_url.trim_end_matches('/'),
        decision.action()
      )
    };
    Self { approve: link(Decision::Approve), reject: link(Decision::Reject) }
  }
}

/// Summary sent to the operations address when a request is submitted.
pub fn submitted_summary(ops_address: &str, request: &Request) -> Message {
  let html = format!(
    "<p>A new data request has been submitted:</p>\n\
     <ul>\n\
     <li><strong>Requester:</strong> {name}</li>\n\
     {details}\
     </ul>\n\
     <p>Check the dashboard for further action.</p>\n",
    name = escape_html(&request.requester_name),
    details = detail_items(request, NO_NOTES_SUMMARY),
  );
  Message {
    to: ops_address.to_owned(),
    subject: "New Data Request Submitted".to_owned(),
    html,
  }
}

/// Decision request sent to the approver, carrying the action links.
pub fn approval_request(request: &Request, links: &ActionLinks) -> Message {
  let html = format!(
    "<p>A new data request has been submitted by {name}:</p>\n\
     <ul>\n\
     {details}\
     </ul>\n\
     <p>Approve or reject the request using the links below:</p>\n\
     <a href=\"{approve}\" style=\"color: green;\">Approve</a> | \
     <a href=\"{reject}\" style=\"color: red;\">Reject</a>\n",
    name = escape_html(&request.requester_name),
    details = detail_items(request, NO_NOTES_SUMMARY),
    approve = escape_html(&links.approve),
    reject = escape_html(&links.reject),
  );
  Message {
    to: request.authorized_email.clone(),
    subject: "Approve or Reject Data Request".to_owned(),
    html,
  }
}

/// Outcome notice sent to the requester after a decision.
pub fn decision_notice(request: &Request, decision: Decision) -> Message {
  let opening = match decision {
    Decision::Approve => "Your data request has been <strong>approved</strong>.",
    Decision::Reject => {
      "Unfortunately, your data request has been <strong>rejected</strong>."
    }
  };
  let html = format!(
    "<p>Dear {name},</p>\n\
     <p>{opening}</p>\n\
     <ul>\n\
     <li><strong>Request Type:</strong> {request_type}</li>\n\
     <li><strong>Preferred Data Retrieval Date:</strong> {date}</li>\n\
     <li><strong>Notes:</strong> {notes}</li>\n\
     </ul>\n\
     <p>Thank you!</p>\n\
     <p>{SIGNATURE}</p>\n",
    name = escape_html(&request.requester_name),
    request_type = escape_html(request.request_type.as_str()),
    date = escape_html(&request.requested_date),
    notes = notes_or(request, NO_NOTES_OUTCOME),
  );
  Message {
    to: request.requester_email.clone(),
    subject: format!("Your data request has been {}", decision.past_tense()),
    html,
  }
}

/// Short notice to the operations address that a request was rejected.
pub fn rejection_notice(ops_address: &str, id: RequestId) -> Message {
  Message {
    to: ops_address.to_owned(),
    subject: "Data Request Rejected".to_owned(),
    html: format!("<p>Request {id} has been rejected.</p>\n"),
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn detail_items(request: &Request, no_notes: &str) -> String {
  format!(
    "<li><strong>Email:</strong> {email}</li>\n\
     <li><strong>Type:</strong> {request_type}</li>\n\
     <li><strong>Date Needed:</strong> {date}</li>\n\
     <li><strong>Notes:</strong> {notes}</li>\n",
    email = escape_html(&request.requester_email),
    request_type = escape_html(request.request_type.as_str()),
    date = escape_html(&request.requested_date),
    notes = notes_or(request, no_notes),
  )
}

fn notes_or(request: &Request, placeholder: &str) -> String {
  match request.notes.as_deref().map(str::trim) {
    Some(notes) if !notes.is_empty() => escape_html(notes),
    _ => placeholder.to_owned(),
  }
}

/// Escape the five characters that are significant in HTML text and
/// attribute values.
pub fn escape_html(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for c in s.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      c => out.push(c),
    }
  }
  out
}
