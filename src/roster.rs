//! Companies tracked by the monitor

use crate::errors::{MonitorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub name: String,
    pub url: String,
    pub search_terms: String,
}

impl Company {
    pub fn new(name: &str, url: &str, search_terms: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            search_terms: search_terms.to_string(),
        }
    }
}

/// Fixed list of companies a monitor run covers
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Roster {
    companies: Vec<Company>,
}

impl Roster {
    pub fn new(companies: Vec<Company>) -> Self {
        Self { companies }
    }

    /// Grain quality inspection vendors tracked out of the box
    pub fn builtin() -> Self {
        let entries: [(&str, &str, &str); 22] = [
            ("FOSS", "https://www.fossanalytics.com", "FOSS grain analyzer"),
            ("Perten", "https://www.perkinelmer.com", "Perten grain analysis"),
            ("Bruker", "https://www.bruker.com", "Bruker grain NIR"),
            ("Zeutec", "https://www.zeutec.com", "Zeutec grain analyzer"),
            ("Cgrain", "https://www.cgrain.ai", "Cgrain Value grain quality"),
            ("Videometer", "https://videometer.com", "Videometer seed imaging"),
            ("Inarix", "https://www.inarix.com", "Inarix grain quality"),
            ("ZoomAgri", "https://www.zoomagri.com", "ZoomAgri grain quality"),
            ("GrainSense", "https://www.grainsense.com", "GrainSense analyzer"),
            ("GoMicro", "https://www.gomicro.co", "GoMicro grain assessment"),
            ("QualySense", "https://www.qualysense.com", "QualySense grain sorting"),
            ("Next Instruments", "https://www.nextinstruments.net", "Next Instruments grain"),
            ("DICKEY-john", "https://www.dickey-john.com", "DICKEY-john grain moisture"),
            ("Seedburo", "https://www.seedburo.com", "Seedburo grain testing"),
            ("Satake", "https://www.satake-group.com", "Satake grain"),
            ("Bühler", "https://www.buhlergroup.com", "Buhler grain sorting"),
            ("TOMRA", "https://www.tomra.com", "TOMRA grain sorting"),
            ("KPM Analytics", "https://www.kpmanalytics.com", "KPM Analytics grain"),
            ("Kett", "https://www.kett.com", "Kett grain moisture meter"),
            ("Hone", "https://hone.ag", "Hone Ag grain analysis"),
            ("Neogen", "https://www.neogen.com", "Neogen mycotoxin grain"),
            ("Romer Labs", "https://www.romerlabs.com", "Romer Labs mycotoxin"),
        ];

        Self {
            companies: entries
                .iter()
                .map(|(name, url, terms)| Company::new(name, url, terms))
                .collect(),
        }
    }

    /// Load a roster from a JSON array of companies
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let companies: Vec<Company> = serde_json::from_str(&contents)?;
        Ok(Self { companies })
    }

    /// Reject rosters that would produce ambiguous or empty reports
    pub fn validate(&self) -> Result<()> {
        if self.companies.is_empty() {
            return Err(MonitorError::Roster("roster is empty".to_string()));
        }

        let mut seen = HashSet::new();
        for company in &self.companies {
            if company.name.trim().is_empty() {
                return Err(MonitorError::Roster("company name cannot be empty".to_string()));
            }
            if company.url.trim().is_empty() {
                return Err(MonitorError::Roster(format!(
                    "company '{}' has no homepage URL",
                    company.name
                )));
            }
            if !seen.insert(company.name.as_str()) {
                return Err(MonitorError::Roster(format!(
                    "duplicate company name: {}",
                    company.name
                )));
            }
        }

        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Company> {
        self.companies.iter()
    }

    pub fn len(&self) -> usize {
        self.companies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.companies.iter().map(|c| c.name.as_str()).collect()
    }
}
