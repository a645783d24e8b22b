use rust_decimal::{Decimal, RoundingStrategy};

use super::types::*;

/// Builder for canonical invoices constructed in code rather than mapped
/// from XML.
///
/// Totals default to the sums of the lines when not set explicitly.
///
/// ```
/// use erechnung::core::*;
/// use rust_decimal_macros::dec;
///
/// let invoice = InvoiceBuilder::new("RE-2024-001", "2024-06-15")
///     .seller(PartyBuilder::new("ACME GmbH", AddressBuilder::new("DE").city("Berlin").build())
///         .vat_id("DE123456789")
///         .build())
///     .buyer(PartyBuilder::new("Kunde AG", AddressBuilder::new("DE").build()).build())
///     .add_line(LineItemBuilder::new("Beratung", dec!(10), dec!(150)).unit("HUR").tax(dec!(19)).build())
///     .build();
///
/// assert_eq!(invoice.line_items[0].id, "1");
/// assert_eq!(invoice.totals.gross, Some(dec!(1785.00)));
/// ```
pub struct InvoiceBuilder {
    invoice_number: String,
    issue_date: String,
    currency: String,
    seller: PartyInfo,
    buyer: PartyInfo,
    totals: Option<Totals>,
    line_items: Vec<LineItem>,
    payment_terms: Option<PaymentTerms>,
    references: Option<References>,
}

impl InvoiceBuilder {
    pub fn new(invoice_number: impl Into<String>, issue_date: impl Into<String>) -> Self {
        Self {
            invoice_number: invoice_number.into(),
            issue_date: issue_date.into(),
            currency: DEFAULT_CURRENCY.to_string(),
            seller: PartyInfo::default(),
            buyer: PartyInfo::default(),
            totals: None,
            line_items: Vec::new(),
            payment_terms: None,
            references: None,
        }
    }

    pub fn currency(mut self, code: impl Into<String>) -> Self {
        self.currency = code.into();
        self
    }

    pub fn seller(mut self, party: PartyInfo) -> Self {
        self.seller = party;
        self
    }

    pub fn buyer(mut self, party: PartyInfo) -> Self {
        self.buyer = party;
        self
    }

    /// Set the header totals instead of deriving them from the lines.
    pub fn totals(mut self, totals: Totals) -> Self {
        self.totals = Some(totals);
        self
    }

    /// Append a line. Its id becomes its 1-based position.
    pub fn add_line(mut self, mut line: LineItem) -> Self {
        line.id = (self.line_items.len() + 1).to_string();
        self.line_items.push(line);
        self
    }

    pub fn due_date(mut self, date: impl Into<String>) -> Self {
        self.payment_terms
            .get_or_insert_with(PaymentTerms::default)
            .due_date = Some(date.into());
        self
    }

    pub fn payment_terms_text(mut self, terms: impl Into<String>) -> Self {
        self.payment_terms
            .get_or_insert_with(PaymentTerms::default)
            .terms = Some(terms.into());
        self
    }

    pub fn bank_account(
        mut self,
        iban: impl Into<String>,
        bic: Option<String>,
        account_holder: Option<String>,
    ) -> Self {
        self.payment_terms
            .get_or_insert_with(PaymentTerms::default)
            .payment_means = Some(PaymentMeans {
            iban: Some(iban.into()),
            bic,
            account_holder,
        });
        self
    }

    pub fn purchase_order(mut self, reference: impl Into<String>) -> Self {
        self.references
            .get_or_insert_with(References::default)
            .purchase_order = Some(reference.into());
        self
    }

    pub fn contract(mut self, reference: impl Into<String>) -> Self {
        self.references
            .get_or_insert_with(References::default)
            .contract = Some(reference.into());
        self
    }

    pub fn build(self) -> CanonicalInvoice {
        let totals = self.totals.unwrap_or_else(|| {
            let sum = |amount: fn(&LineItem) -> Decimal| {
                self.line_items
                    .iter()
                    .map(amount)
                    .fold(Decimal::ZERO, Decimal::saturating_add)
            };
            let net = sum(|l| l.net_amount);
            let tax = sum(|l| l.tax_amount);
            Totals::new(net, tax, net.saturating_add(tax))
        });

        CanonicalInvoice {
            invoice_number: self.invoice_number,
            issue_date: self.issue_date,
            currency: self.currency,
            seller: self.seller,
            buyer: self.buyer,
            totals,
            line_items: self.line_items,
            payment_terms: self.payment_terms,
            references: self.references,
        }
    }
}

/// Builder for seller and buyer parties.
pub struct PartyBuilder {
    name: String,
    vat_id: Option<String>,
    address: Address,
    contact: Option<Contact>,
}

impl PartyBuilder {
    pub fn new(name: impl Into<String>, address: Address) -> Self {
        Self {
            name: name.into(),
            vat_id: None,
            address,
            contact: None,
        }
    }

    pub fn vat_id(mut self, id: impl Into<String>) -> Self {
        self.vat_id = Some(id.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.contact.get_or_insert_with(Contact::default).email = Some(email.into());
        self
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.contact.get_or_insert_with(Contact::default).phone = Some(phone.into());
        self
    }

    pub fn build(self) -> PartyInfo {
        PartyInfo {
            name: self.name,
            vat_id: self.vat_id,
            address: self.address,
            contact: self.contact,
        }
    }
}

/// Builder for postal addresses.
pub struct AddressBuilder {
    country: String,
    city: Option<String>,
    postal_code: Option<String>,
    street: Option<String>,
}

impl AddressBuilder {
    pub fn new(country: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            city: None,
            postal_code: None,
            street: None,
        }
    }

    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn postal_code(mut self, postal_code: impl Into<String>) -> Self {
        self.postal_code = Some(postal_code.into());
        self
    }

    pub fn street(mut self, street: impl Into<String>) -> Self {
        self.street = Some(street.into());
        self
    }

    pub fn build(self) -> Address {
        Address {
            country: self.country,
            city: self.city,
            postal_code: self.postal_code,
            street: self.street,
        }
    }
}

/// Builder for invoice lines.
///
/// The net amount defaults to `quantity × unit_price`, the tax amount to the
/// net amount at the given rate rounded half-up to cents.
pub struct LineItemBuilder {
    description: String,
    quantity: Decimal,
    unit: String,
    unit_price: Decimal,
    net_amount: Option<Decimal>,
    tax_rate: Decimal,
    tax_amount: Option<Decimal>,
}

impl LineItemBuilder {
    pub fn new(description: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit: DEFAULT_UNIT_CODE.to_string(),
            unit_price,
            net_amount: None,
            tax_rate: Decimal::ZERO,
            tax_amount: None,
        }
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn tax(mut self, rate: Decimal) -> Self {
        self.tax_rate = rate;
        self
    }

    /// Override the derived net amount.
    pub fn net_amount(mut self, amount: Decimal) -> Self {
        self.net_amount = Some(amount);
        self
    }

    /// Override the derived tax amount.
    pub fn tax_amount(mut self, amount: Decimal) -> Self {
        self.tax_amount = Some(amount);
        self
    }

    pub fn build(self) -> LineItem {
        // Derived amounts saturate; the rule engine reports the mismatch.
        let net_amount = self
            .net_amount
            .unwrap_or_else(|| self.quantity.saturating_mul(self.unit_price));
        let tax_amount = self.tax_amount.unwrap_or_else(|| {
            (net_amount.saturating_mul(self.tax_rate) / Decimal::ONE_HUNDRED)
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        });

        LineItem {
            id: String::new(),
            description: self.description,
            quantity: self.quantity,
            unit: self.unit,
            unit_price: self.unit_price,
            net_amount,
            tax_rate: self.tax_rate,
            tax_amount,
        }
    }
}
