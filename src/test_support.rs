// Fixture builders shared by the unit tests.

/// One line of a synthetic docket page.
pub struct DocketFixtureRow {
    pub date: String,
    pub code: String,
    pub description: String,
    pub party: String,
    pub amount: String,
}

impl DocketFixtureRow {
    pub fn new(date: &str, code: &str, description: &str, party: &str, amount: &str) -> Self {
        Self {
            date: date.to_string(),
            code: code.to_string(),
            description: description.to_string(),
            party: party.to_string(),
            amount: amount.to_string(),
        }
    }
}

/// A docket page in the shape the court portal renders: a case style table
/// that must be ignored, then one `docketlist ocis` table.
pub fn docket_page(rows: &[DocketFixtureRow]) -> String {
    let mut body = String::new();
    for row in rows {
        body.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>1</td><td>{}</td><td>{}</td></tr>\n",
            row.date, row.code, row.description, row.party, row.amount
        ));
    }
    format!(
        "<html><body>\
         <table class=\"caseStyle\"><tr><td>State of Oklahoma v. Defendant</td></tr></table>\
         <table class=\"docketlist ocis\">\
         <thead><tr><th>Date</th><th>Code</th><th>Description</th><th>Count</th><th>Party</th><th>Amount</th></tr></thead>\
         <tbody>\n{body}</tbody></table>\
         </body></html>"
    )
}
