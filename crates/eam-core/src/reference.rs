//! Reference data: the selectable option sets behind classification and
//! assignment fields.
//!
//! Categories, sub-categories and asset groups form a three-level tree linked
//! by parent keys. Everything else is a flat list. The data is read-only to
//! the form.

use serde::{Deserialize, Serialize};

use crate::Result;

/// Fixed choices for [`crate::record::Field::Os`].
pub const OPERATING_SYSTEMS: [&str; 5] = ["Windows 11", "Windows 10", "macOS", "Linux", "Other"];

/// Fixed choices for [`crate::record::Field::VerificationCycle`].
pub const VERIFICATION_CYCLES: [&str; 4] = ["Q1-2026", "Q2-2026", "Q3-2026", "Q4-2026"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionItem {
  pub id:   String,
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubCategory {
  pub id:          String,
  pub category_id: String,
  pub name:        String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetGroup {
  pub id:              String,
  pub sub_category_id: String,
  pub name:            String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReferenceData {
  pub account_heads:  Vec<OptionItem>,
  pub categories:     Vec<OptionItem>,
  pub sub_categories: Vec<SubCategory>,
  pub asset_groups:   Vec<AssetGroup>,
  pub asset_models:   Vec<OptionItem>,
  pub manufacturers:  Vec<OptionItem>,
  pub departments:    Vec<OptionItem>,
  pub cost_centers:   Vec<OptionItem>,
  pub locations:      Vec<OptionItem>,
}

impl ReferenceData {
  /// Load option sets from a JSON document with the camelCase list names.
  pub fn from_json(json: &str) -> Result<Self> { Ok(serde_json::from_str(json)?) }

  /// Sub-categories whose parent is `category_id`. Empty for an empty key.
  pub fn sub_categories_for(&self, category_id: &str) -> Vec<&SubCategory> {
    if category_id.is_empty() {
      return Vec::new();
    }
    self
      .sub_categories
      .iter()
      .filter(|sc| sc.category_id == category_id)
      .collect()
  }

  /// Asset groups whose parent is `sub_category_id`. Empty for an empty key.
  pub fn asset_groups_for(&self, sub_category_id: &str) -> Vec<&AssetGroup> {
    if sub_category_id.is_empty() {
      return Vec::new();
    }
    self
      .asset_groups
      .iter()
      .filter(|ag| ag.sub_category_id == sub_category_id)
      .collect()
  }

  pub fn sub_category_belongs(&self, sub_category_id: &str, category_id: &str) -> bool {
    self
      .sub_categories
      .iter()
      .any(|sc| sc.id == sub_category_id && sc.category_id == category_id)
  }

  pub fn asset_group_belongs(&self, asset_group_id: &str, sub_category_id: &str) -> bool {
    self
      .asset_groups
      .iter()
      .any(|ag| ag.id == asset_group_id && ag.sub_category_id == sub_category_id)
  }

  /// Find a category key by its display name.
  pub fn category_id(&self, name: &str) -> Option<&str> {
    self
      .categories
      .iter()
      .find(|c| c.name == name)
      .map(|c| c.id.as_str())
  }

  /// The built-in option sets shipped with the application.
  pub fn builtin() -> Self {
    Self {
      account_heads:  items(&[
        ("ah001", "Fixed Assets"),
        ("ah002", "Current Assets"),
        ("ah003", "Office Equipment"),
        ("ah004", "IT Infrastructure"),
        ("ah005", "Furniture & Fixtures"),
        ("ah006", "Vehicles"),
        ("ah007", "Plant & Machinery"),
      ]),
      categories:     items(&[
        ("cat001", "Computer & Peripherals"),
        ("cat002", "Network Equipment"),
        ("cat003", "Furniture"),
        ("cat004", "Vehicles"),
        ("cat005", "Office Equipment"),
        ("cat006", "Manufacturing Equipment"),
        ("cat007", "HVAC & Utilities"),
        ("cat008", "Safety Equipment"),
      ]),
      sub_categories: [
        ("sub001", "cat001", "Laptops"),
        ("sub002", "cat001", "Desktop Computers"),
        ("sub003", "cat001", "Monitors"),
        ("sub004", "cat001", "Printers"),
        ("sub005", "cat001", "Scanners"),
        ("sub006", "cat002", "Routers"),
        ("sub007", "cat002", "Switches"),
        ("sub008", "cat002", "Wireless Access Points"),
        ("sub009", "cat002", "Firewalls"),
        ("sub010", "cat003", "Office Chairs"),
        ("sub011", "cat003", "Desks & Tables"),
        ("sub012", "cat003", "Storage Cabinets"),
        ("sub013", "cat003", "Meeting Room Furniture"),
        ("sub014", "cat004", "Cars"),
        ("sub015", "cat004", "Vans"),
        ("sub016", "cat004", "Trucks"),
        ("sub017", "cat005", "Copiers"),
        ("sub018", "cat005", "Projectors"),
        ("sub019", "cat005", "Telephones"),
        ("sub020", "cat005", "Shredders"),
      ]
      .into_iter()
      .map(|(id, category_id, name)| SubCategory {
        id:          id.into(),
        category_id: category_id.into(),
        name:        name.into(),
      })
      .collect(),
      asset_groups:   [
        ("grp001", "sub001", "Business Laptops"),
        ("grp002", "sub001", "Gaming Laptops"),
        ("grp003", "sub001", "Ultrabooks"),
        ("grp004", "sub002", "Workstations"),
        ("grp005", "sub002", "All-in-One PCs"),
        ("grp006", "sub002", "Mini PCs"),
        ("grp007", "sub003", "LED Monitors"),
        ("grp008", "sub003", "LCD Monitors"),
        ("grp009", "sub004", "Laser Printers"),
        ("grp010", "sub004", "Inkjet Printers"),
        ("grp011", "sub004", "Multi-function Printers"),
        ("grp012", "sub010", "Executive Chairs"),
        ("grp013", "sub010", "Task Chairs"),
        ("grp014", "sub010", "Conference Chairs"),
      ]
      .into_iter()
      .map(|(id, sub_category_id, name)| AssetGroup {
        id:              id.into(),
        sub_category_id: sub_category_id.into(),
        name:            name.into(),
      })
      .collect(),
      asset_models:   items(&[
        ("mod001", "Dell Latitude 7420"),
        ("mod002", "HP EliteBook 840 G9"),
        ("mod003", "Lenovo ThinkPad X1 Carbon Gen 11"),
        ("mod004", "MacBook Pro 16-inch M3"),
        ("mod005", "Dell OptiPlex 7090"),
        ("mod006", "HP EliteDesk 800 G9"),
        ("mod007", "Lenovo ThinkCentre M90t"),
        ("mod008", "Dell UltraSharp U2723DE"),
        ("mod009", "LG 27UP850-W"),
        ("mod010", "Samsung S27A600U"),
        ("mod011", "HP LaserJet Enterprise M607"),
        ("mod012", "Canon imageCLASS LBP226dw"),
        ("mod013", "Epson EcoTank ET-4850"),
        ("mod014", "Steelcase Gesture Chair"),
        ("mod015", "Herman Miller Aeron"),
        ("mod016", "Ikea BEKANT Desk"),
      ]),
      manufacturers:  items(&[
        ("mfr001", "Dell"),
        ("mfr002", "HP"),
        ("mfr003", "Lenovo"),
        ("mfr004", "Apple"),
        ("mfr005", "Samsung"),
        ("mfr006", "LG"),
        ("mfr007", "Canon"),
        ("mfr008", "Epson"),
        ("mfr009", "Cisco"),
        ("mfr010", "Steelcase"),
        ("mfr011", "Herman Miller"),
        ("mfr012", "Ikea"),
        ("mfr013", "Microsoft"),
        ("mfr014", "Asus"),
        ("mfr015", "Acer"),
      ]),
      departments:    items(&[
        ("dept001", "Information Technology"),
        ("dept002", "Finance & Accounting"),
        ("dept003", "Human Resources"),
        ("dept004", "Operations"),
        ("dept005", "Sales & Marketing"),
        ("dept006", "Production"),
        ("dept007", "Quality Assurance"),
        ("dept008", "Research & Development"),
        ("dept009", "Customer Service"),
        ("dept010", "Administration"),
      ]),
      cost_centers:   items(&[
        ("cc001", "CC-IT-001 - IT Infrastructure"),
        ("cc002", "CC-FIN-001 - Finance Department"),
        ("cc003", "CC-HR-001 - Human Resources"),
        ("cc004", "CC-OPS-001 - Operations"),
        ("cc005", "CC-SAL-001 - Sales"),
        ("cc006", "CC-MKT-001 - Marketing"),
        ("cc007", "CC-PRD-001 - Production"),
        ("cc008", "CC-QA-001 - Quality Control"),
        ("cc009", "CC-RND-001 - R&D"),
        ("cc010", "CC-ADM-001 - Administration"),
      ]),
      locations:      items(&[
        ("loc001", "Headquarters - Mumbai"),
        ("loc002", "Branch Office - Delhi"),
        ("loc003", "Branch Office - Bangalore"),
        ("loc004", "Branch Office - Chennai"),
        ("loc005", "Branch Office - Hyderabad"),
        ("loc006", "Branch Office - Pune"),
        ("loc007", "Warehouse - Thane"),
        ("loc008", "Warehouse - Gurgaon"),
        ("loc009", "Manufacturing Plant - Gujarat"),
        ("loc010", "Data Center - Navi Mumbai"),
      ]),
    }
  }
}

fn items(pairs: &[(&str, &str)]) -> Vec<OptionItem> {
  pairs
    .iter()
    .map(|(id, name)| OptionItem { id: (*id).into(), name: (*name).into() })
    .collect()
}
