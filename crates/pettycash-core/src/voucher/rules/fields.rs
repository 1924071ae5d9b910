//! Header field extraction.

use rust_decimal::Decimal;
use tracing::debug;

use super::amounts::parse_amount;
use super::patterns::*;
use super::{ExtractionMatch, FallbackChain, FieldExtractor};

/// Scalar fields printed in the voucher header and footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderField {
    VoucherNo,
    PaidTo,
    StaffNo,
    Email,
    ContactNo,
    Department,
    CostCenter,
    Station,
    Date,
    AmountInWords,
    ApprovedBy,
    ReceivedCash,
    StatedTotal,
}

impl HeaderField {
    pub const ALL: [HeaderField; 13] = [
        HeaderField::VoucherNo,
        HeaderField::PaidTo,
        HeaderField::StaffNo,
        HeaderField::Email,
        HeaderField::ContactNo,
        HeaderField::Department,
        HeaderField::CostCenter,
        HeaderField::Station,
        HeaderField::Date,
        HeaderField::AmountInWords,
        HeaderField::ApprovedBy,
        HeaderField::ReceivedCash,
        HeaderField::StatedTotal,
    ];

    /// Field name as used in warnings and JSON.
    pub fn name(self) -> &'static str {
        match self {
            HeaderField::VoucherNo => "voucher_no",
            HeaderField::PaidTo => "paid_to",
            HeaderField::StaffNo => "staff_no",
            HeaderField::Email => "email",
            HeaderField::ContactNo => "contact_no",
            HeaderField::Department => "department",
            HeaderField::CostCenter => "cost_center",
            HeaderField::Station => "station",
            HeaderField::Date => "date",
            HeaderField::AmountInWords => "amount_in_words",
            HeaderField::ApprovedBy => "approved_by",
            HeaderField::ReceivedCash => "received_cash",
            HeaderField::StatedTotal => "total_amount",
        }
    }

    /// The fallback chain for this field.
    pub fn chain(self) -> &'static FallbackChain {
        match self {
            HeaderField::VoucherNo => &*VOUCHER_NO_CHAIN,
            HeaderField::PaidTo => &*PAID_TO_CHAIN,
            HeaderField::StaffNo => &*STAFF_NO_CHAIN,
            HeaderField::Email => &*EMAIL_CHAIN,
            HeaderField::ContactNo => &*CONTACT_NO_CHAIN,
            HeaderField::Department => &*DEPARTMENT_CHAIN,
            HeaderField::CostCenter => &*COST_CENTER_CHAIN,
            HeaderField::Station => &*STATION_CHAIN,
            HeaderField::Date => &*DATE_CHAIN,
            HeaderField::AmountInWords => &*AMOUNT_IN_WORDS_CHAIN,
            HeaderField::ApprovedBy => &*APPROVED_BY_CHAIN,
            HeaderField::ReceivedCash => &*RECEIVED_CASH_CHAIN,
            HeaderField::StatedTotal => &*STATED_TOTAL_CHAIN,
        }
    }
}

/// Typed wrapper that parses a chain's capture as a currency amount.
///
/// A capture that does not parse yields zero rather than a miss, so the
/// field still shows up on the editing surface for correction.
pub struct AmountExtractor<'a> {
    chain: &'a FallbackChain,
    auto_correct: bool,
}

impl<'a> AmountExtractor<'a> {
    pub fn new(chain: &'a FallbackChain) -> Self {
        Self {
            chain,
            auto_correct: true,
        }
    }

    pub fn with_auto_correct(mut self, auto_correct: bool) -> Self {
        self.auto_correct = auto_correct;
        self
    }
}

impl FieldExtractor for AmountExtractor<'_> {
    type Output = ExtractionMatch<Decimal>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let found = self.chain.extract(text)?;
        let auto_correct = self.auto_correct;
        Some(found.map(|raw| {
            parse_amount(&raw, auto_correct).unwrap_or_else(|| {
                debug!("Unparseable amount {:?}, using zero", raw);
                Decimal::ZERO
            })
        }))
    }
}

/// Values recovered from the voucher header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderFields {
    pub voucher_no: String,
    pub paid_to: String,
    pub staff_no: String,
    pub email: String,
    pub contact_no: String,
    pub department: String,
    pub cost_center: String,
    pub station: String,
    pub date: String,
    pub amount_in_words: String,
    pub approved_by: String,
    pub received_cash: Decimal,
    /// Total printed on the voucher, if any. Never copied into the aggregate.
    pub stated_total: Option<Decimal>,
}

impl HeaderFields {
    /// Run every field chain over `text`.
    ///
    /// Returns the fields together with the ones no chain entry matched.
    /// Missing text fields are empty and missing amounts are zero.
    pub fn extract(text: &str, auto_correct: bool) -> (Self, Vec<HeaderField>) {
        let mut fields = HeaderFields::default();
        let mut missing = Vec::new();

        for field in HeaderField::ALL {
            match field {
                HeaderField::ReceivedCash | HeaderField::StatedTotal => {
                    let extractor =
                        AmountExtractor::new(field.chain()).with_auto_correct(auto_correct);
                    match extractor.extract(text) {
                        Some(found) if field == HeaderField::ReceivedCash => {
                            fields.received_cash = found.value;
                        }
                        Some(found) => fields.stated_total = Some(found.value),
                        None => missing.push(field),
                    }
                }
                _ => match field.chain().extract(text) {
                    Some(found) => {
                        debug!(
                            "{} matched rule {}: {:?}",
                            field.name(),
                            found.rule,
                            found.value
                        );
                        *fields.text_slot(field) = found.value;
                    }
                    None => missing.push(field),
                },
            }
        }

        (fields, missing)
    }

    fn text_slot(&mut self, field: HeaderField) -> &mut String {
        match field {
            HeaderField::VoucherNo => &mut self.voucher_no,
            HeaderField::PaidTo => &mut self.paid_to,
            HeaderField::StaffNo => &mut self.staff_no,
            HeaderField::Email => &mut self.email,
            HeaderField::ContactNo => &mut self.contact_no,
            HeaderField::Department => &mut self.department,
            HeaderField::CostCenter => &mut self.cost_center,
            HeaderField::Station => &mut self.station,
            HeaderField::Date => &mut self.date,
            HeaderField::AmountInWords => &mut self.amount_in_words,
            HeaderField::ApprovedBy => &mut self.approved_by,
            HeaderField::ReceivedCash | HeaderField::StatedTotal => {
                unreachable!("{} is not a text field", field.name())
            }
        }
    }
}
