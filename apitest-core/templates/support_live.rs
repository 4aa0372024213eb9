/// Status a live request must answer with
#[derive(Debug, Clone, Copy)]
pub enum Expected {
    Code(u16),
    /// Any status in `N00..=N99`
    Class(u16),
    Any,
}

impl Expected {
    fn accepts(&self, status: u16) -> bool {
        match self {
            Expected::Code(code) => status == *code,
            Expected::Class(class) => status / 100 == *class,
            Expected::Any => true,
        }
    }
}

/// Send a request and return the body once the status matches
pub fn send(method: &str, url: &str, query: &[(&str, &str)], expected: Expected) -> Result<String, String> {
    let method = reqwest::Method::from_bytes(method.as_bytes()).map_err(|e| e.to_string())?;
    let response = reqwest::blocking::Client::new()
        .request(method, url)
        .query(query)
        .header("Accept", "application/vnd.api+json, application/json")
        .send()
        .map_err(|e| format!("request failed: {}", e))?;

    let status = response.status().as_u16();
    let body = response.text().map_err(|e| format!("could not read response body: {}", e))?;
    if expected.accepts(status) {
        Ok(body)
    } else {
        Err(format!("expected status {:?} but got {}", expected, status))
    }
}
