use crate::utils::error::{EtlError, Result};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://api.jolpi.ca/ergast/f1";

/// URL builder for the Ergast-compatible API.
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    pub fn new(base_url: &str) -> Result<Self> {
        // 確保結尾有 '/'，否則 join 會吃掉最後一段路徑
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base = Url::parse(&normalized).map_err(|e| EtlError::InvalidConfigValueError {
            field: "source.base_url".to_string(),
            value: base_url.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })?;
        Ok(Self { base })
    }

    pub fn driver_standings(&self, year: i32) -> String {
        self.join(&format!("{}/driverStandings.json", year)).to_string()
    }

    pub fn results(&self, year: i32, limit: usize, offset: usize) -> String {
        let mut url = self.join(&format!("{}/results.json", year));
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string());
        url.to_string()
    }

    fn join(&self, path: &str) -> Url {
        // base 已驗證，且 path 只含數字與固定字串
        self.base.join(path).unwrap_or_else(|_| self.base.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standings_url() {
        let endpoints = Endpoints::new("https://api.jolpi.ca/ergast/f1").unwrap();
        assert_eq!(
            endpoints.driver_standings(2023),
            "https://api.jolpi.ca/ergast/f1/2023/driverStandings.json"
        );
    }

    #[test]
    fn test_results_url_with_trailing_slash() {
        let endpoints = Endpoints::new("http://localhost:8080/api/f1/").unwrap();
        assert_eq!(
            endpoints.results(2021, 100, 200),
            "http://localhost:8080/api/f1/2021/results.json?limit=100&offset=200"
        );
    }

    #[test]
    fn test_default_base_url() {
        let endpoints = Endpoints::new(DEFAULT_BASE_URL).unwrap();
        assert!(endpoints.results(1950, 100, 0).starts_with(DEFAULT_BASE_URL));
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(Endpoints::new("not a url").is_err());
    }
}
