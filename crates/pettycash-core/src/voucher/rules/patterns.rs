//! Pattern tables for petty-cash voucher extraction.
//!
//! Chains are matched against normalized text: one OCR line per text line,
//! whitespace runs collapsed to a single space. Append new layouts to the
//! end of a chain.

use lazy_static::lazy_static;
use regex::Regex;

use super::{FallbackChain, PatternSpec};

pub const VOUCHER_NO: &[PatternSpec] = &[
    PatternSpec::new(r"Voucher\s*No\.?\s*\[\s*(\d+)", 1),
    PatternSpec::new(r"Voucher\s*(?:Number|No|#)\.?\s*[:.#]*\s*([A-Z0-9][A-Z0-9/-]*)", 1),
    PatternSpec::new(r"\b(PCV[-/ ]?\d+)\b", 1).case_sensitive(),
];

pub const PAID_TO: &[PatternSpec] = &[
    PatternSpec::new(r"Claim\s*By\s*[:.]*\s*(.+?)\s+Department", 1),
    PatternSpec::new(r"Paid\s*To\s*[:.]*\s*(.+)", 1),
    PatternSpec::new(r"Claim(?:ed)?\s*By\s*[:.]*\s*(.+)", 1),
];

pub const STAFF_NO: &[PatternSpec] = &[
    PatternSpec::new(r"Staff\s*No\.?\s*[:.#]*\s*(\d+)", 1),
    PatternSpec::new(r"(?:Staff|Employee|Emp)\s*(?:ID|Code|Number|#)\s*[:.#]*\s*(\w+)", 1),
];

pub const EMAIL: &[PatternSpec] = &[
    PatternSpec::new(r"E-?mail\s*[:.]*\s*([a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,})", 1),
    PatternSpec::new(r"([a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,})", 1),
];

pub const CONTACT_NO: &[PatternSpec] = &[
    PatternSpec::new(r"(?:Contact|Phone|Mobile|Cell|Tel)\.?\s*(?:No\.?|Number|#)?\s*[:.]*\s*(\+?\d[\d -]{5,}\d)", 1),
];

pub const DEPARTMENT: &[PatternSpec] = &[
    PatternSpec::new(r"Department\s*[:.]*\s*(.+?)\s+Station", 1),
    PatternSpec::new(r"Dep(?:artmen)?t\.?\s*[:.]*\s*(.+)", 1),
];

pub const COST_CENTER: &[PatternSpec] = &[
    PatternSpec::new(r"Cost\s*Cent(?:er|re)\s*[:.]*\s*(\w+)", 1),
    PatternSpec::new(r"\bC/C\s*[:.]*\s*(\w+)", 1),
];

/// Station stops at the next header label on the same line.
pub const STATION: &[PatternSpec] = &[PatternSpec::new(
    r"Station\s*[:.]*\s*(.+?)(?:\s+(?:Date|Staff|Cost|Voucher|Dept|Department|Claim|Paid)\b|$)",
    1,
)];

pub const DATE: &[PatternSpec] = &[
    PatternSpec::new(r"Date\s*[:.]*\s*(\d{2}/\d{2}/\d{4})", 1),
    PatternSpec::new(r"Date\s*[:.]*\s*(\d{1,2}[-./]\d{1,2}[-./]\d{2,4})", 1),
    PatternSpec::new(r"Date\s*[:.]*\s*(\d{1,2}\s+[a-z]{3,9}\.?,?\s+\d{4})", 1),
];

pub const AMOUNT_IN_WORDS: &[PatternSpec] = &[
    PatternSpec::new(r"Amount\s*in\s*words\s*[:.]*\s*(.+)", 1),
    PatternSpec::new(r"\b(?:Rupees|Rs\.?)\s+([a-z][a-z -]*?\bonly)\b", 1),
];

pub const APPROVED_BY: &[PatternSpec] = &[
    PatternSpec::new(r"Approved\s*By\s*[:.]*\s*(.+)", 1),
    PatternSpec::new(r"Authori[sz]ed\s*By\s*[:.]*\s*(.+)", 1),
    PatternSpec::new(r"Sanctioned\s*By\s*[:.]*\s*(.+)", 1),
];

pub const RECEIVED_CASH: &[PatternSpec] = &[
    PatternSpec::new(r"Received\s*Cash\s*[:.]*\s*(?:Rs\.?\s*)?(\d[\d,]*(?:\.\d{1,2})?)", 1),
    PatternSpec::new(r"Cash\s*Received\s*[:.]*\s*(\S+)", 1),
];

/// Printed total. Advisory only: the voucher total is always the line sum.
pub const STATED_TOTAL: &[PatternSpec] = &[PatternSpec::new(
    r"\bTotal\s*(?:Amount)?\s*[:.]*\s*(?:Rs\.?\s*)?(\d[\d,]*(?:\.\d{1,2})?)",
    1,
)];

/// `[date] details whole cents`, e.g. `Book 300 00` or `12/03/2025 Taxi 1,200.50`.
pub const LINE_ITEM_ROW: PatternSpec = PatternSpec::new(
    r"^(?:(\d{1,2}/\d{1,2}/\d{4})\s+)?([a-z][a-z0-9 &/().,'-]*?)\s+(\d{1,3}(?:,\d{3})+|\d+)[\s.,](\d{1,2})$",
    0,
);

/// `account cc | budget utilised variance this_payment [cents]`.
pub const BUDGET_ROW: PatternSpec = PatternSpec::new(
    r"^(\d+)\s+(\d+)\s*\|\s*([^\s|]+)\s+([^\s|]+)\s+([^\s|]+)\s+([^\s|]+?)(?:[\s.](\d{1,2}))?$",
    0,
);

/// `account cc | flight aircraft project whole cents xref description`.
pub const ALLOCATION_ROW: PatternSpec = PatternSpec::new(
    r"^(\d+)\s+(\d+)\s*\|\s*(\w+)\s+(\w+)\s+(\w+)\s+(\d[\d,]*)[\s.](\d{1,2})\s+(\w+)(?:\s+(.+))?$",
    0,
);

/// Line item descriptions that are really header or footer labels.
pub const RESERVED_LABEL: PatternSpec = PatternSpec::new(
    r"^(?:(?:sub|grand)\s*)?total\b|^received\b|^cash\b|^amount\b|^balance\b|^voucher\b|^staff\b|^date\b|^cost\s*cent|^station\b|^dep(?:artmen)?t\b|^claim|^paid\b|^approved\b|^contact\b|^phone\b|^budget\b",
    0,
);

lazy_static! {
    pub static ref VOUCHER_NO_CHAIN: FallbackChain = FallbackChain::compile(VOUCHER_NO);
    pub static ref PAID_TO_CHAIN: FallbackChain = FallbackChain::compile(PAID_TO);
    pub static ref STAFF_NO_CHAIN: FallbackChain = FallbackChain::compile(STAFF_NO);
    pub static ref EMAIL_CHAIN: FallbackChain = FallbackChain::compile(EMAIL);
    pub static ref CONTACT_NO_CHAIN: FallbackChain = FallbackChain::compile(CONTACT_NO);
    pub static ref DEPARTMENT_CHAIN: FallbackChain = FallbackChain::compile(DEPARTMENT);
    pub static ref COST_CENTER_CHAIN: FallbackChain = FallbackChain::compile(COST_CENTER);
    pub static ref STATION_CHAIN: FallbackChain = FallbackChain::compile(STATION);
    pub static ref DATE_CHAIN: FallbackChain = FallbackChain::compile(DATE);
    pub static ref AMOUNT_IN_WORDS_CHAIN: FallbackChain = FallbackChain::compile(AMOUNT_IN_WORDS);
    pub static ref APPROVED_BY_CHAIN: FallbackChain = FallbackChain::compile(APPROVED_BY);
    pub static ref RECEIVED_CASH_CHAIN: FallbackChain = FallbackChain::compile(RECEIVED_CASH);
    pub static ref STATED_TOTAL_CHAIN: FallbackChain = FallbackChain::compile(STATED_TOTAL);

    pub static ref LINE_ITEM_PATTERN: Regex = LINE_ITEM_ROW.compile().unwrap();
    pub static ref BUDGET_PATTERN: Regex = BUDGET_ROW.compile().unwrap();
    pub static ref ALLOCATION_PATTERN: Regex = ALLOCATION_ROW.compile().unwrap();
    pub static ref RESERVED_LABEL_PATTERN: Regex = RESERVED_LABEL.compile().unwrap();
}
