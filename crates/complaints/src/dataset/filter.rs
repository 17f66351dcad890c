//! Two-level region → organization selection

use thiserror::Error;

use super::Dataset;

/// How many choices to list in a validation message before truncating
const MAX_LISTED_CHOICES: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
  #[error("The dataset has no complaints with a region")]
  NoRegions,

  #[error("Unknown region '{region}'. Available regions: {available}")]
  UnknownRegion { region: String, available: String },

  #[error("No companies have complaints in {region}")]
  NoCompanies { region: String },

  #[error("'{company}' has no complaints in {region}. Companies in {region}: {available}")]
  CompanyNotInRegion { company: String, region: String, available: String },
}

/// The region and organization the dashboard views are scoped to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
  pub region: String,
  pub company: String,
}

impl Selection {
  /// Resolve user choices against the dataset
  ///
  /// An omitted region defaults to the first region in sorted order and an
  /// omitted company to the first company with complaints in that region.
  /// Only companies present in the selected region are accepted.
  pub fn resolve(
    dataset: &Dataset,
    region: Option<&str>,
    company: Option<&str>,
  ) -> Result<Self, FilterError> {
    let regions = dataset.regions();
    let region = match region {
      Some(wanted) => regions.iter().copied().find(|r| *r == wanted).ok_or_else(|| {
        FilterError::UnknownRegion { region: wanted.to_string(), available: list_choices(&regions) }
      })?,
      None => regions.first().copied().ok_or(FilterError::NoRegions)?,
    };

    let companies = dataset.companies_in_region(region);
    let company = match company {
      Some(wanted) => companies.iter().copied().find(|c| *c == wanted).ok_or_else(|| {
        FilterError::CompanyNotInRegion {
          company: wanted.to_string(),
          region: region.to_string(),
          available: list_choices(&companies),
        }
      })?,
      None => companies
        .first()
        .copied()
        .ok_or_else(|| FilterError::NoCompanies { region: region.to_string() })?,
    };

    Ok(Self { region: region.to_string(), company: company.to_string() })
  }
}

fn list_choices(choices: &[&str]) -> String {
  if choices.is_empty() {
    return "(none)".to_string();
  }

  let shown = choices.iter().take(MAX_LISTED_CHOICES).copied().collect::<Vec<_>>().join(", ");
  match choices.len().checked_sub(MAX_LISTED_CHOICES) {
    Some(hidden) if hidden > 0 => format!("{shown} and {hidden} more"),
    _ => shown,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::dataset::ComplaintRecord;

  fn dataset(rows: &[(i64, Option<&str>, Option<&str>)]) -> Dataset {
    let records = rows
      .iter()
      .map(|(id, state, company)| {
        let mut record = ComplaintRecord::new(*id);
        record.state = state.map(str::to_string);
        record.company = company.map(str::to_string);
        record
      })
      .collect();
    Dataset::from_records(records).unwrap()
  }

  #[test]
  fn test_defaults_pick_first_region_and_company() {
    let data = dataset(&[(1, Some("TX"), Some("Zeta")), (2, Some("CA"), Some("Beta")), (3, Some("CA"), Some("Acme"))]);

    let selection = Selection::resolve(&data, None, None).unwrap();
    assert_eq!(selection, Selection { region: "CA".to_string(), company: "Acme".to_string() });

    let selection = Selection::resolve(&data, Some("TX"), None).unwrap();
    assert_eq!(selection.company, "Zeta");
  }

  #[test]
  fn test_company_must_have_complaints_in_region() {
    let data = dataset(&[(1, Some("TX"), Some("Zeta")), (2, Some("CA"), Some("Beta"))]);

    let err = Selection::resolve(&data, Some("TX"), Some("Beta")).unwrap_err();
    assert_eq!(
      err,
      FilterError::CompanyNotInRegion {
        company: "Beta".to_string(),
        region: "TX".to_string(),
        available: "Zeta".to_string(),
      }
    );
  }

  #[test]
  fn test_unknown_region_lists_choices() {
    let data = dataset(&[(1, Some("TX"), Some("Zeta")), (2, Some("CA"), Some("Beta"))]);
    let err = Selection::resolve(&data, Some("NY"), None).unwrap_err();
    assert_eq!(err.to_string(), "Unknown region 'NY'. Available regions: CA, TX");
  }

  #[test]
  fn test_region_without_companies() {
    let data = dataset(&[(1, Some("TX"), None)]);
    assert_eq!(
      Selection::resolve(&data, None, None).unwrap_err(),
      FilterError::NoCompanies { region: "TX".to_string() }
    );
    assert_eq!(Selection::resolve(&dataset(&[(1, None, Some("Acme"))]), None, None).unwrap_err(), FilterError::NoRegions);
  }

  #[test]
  fn test_list_choices_truncates() {
    let many: Vec<String> = (0..12).map(|i| format!("C{i:02}")).collect();
    let refs: Vec<&str> = many.iter().map(String::as_str).collect();
    let listed = list_choices(&refs);
    assert!(listed.starts_with("C00, C01"));
    assert!(listed.ends_with("C09 and 2 more"));
  }
}
