use std::sync::Arc;

use chrono::Utc;

use crate::catalog::CatalogSeed;
use crate::store::MemoryStore;

pub(crate) const CATALOG_FIXTURE: &str = r#"{
  "contests": [
    {
      "name": "Masters Test 2025",
      "year": 2025,
      "tests": [{ "test": "tage_mage", "weightPercent": 100 }]
    },
    {
      "name": "TOEFL iBT 2026",
      "year": 2026,
      "tests": [{ "test": "toefl", "minimumScore": 80 }],
      "contestDeadlines": [
        { "title": "Session de mars", "type": "test", "dueAt": "2026-03-14T09:00:00Z" },
        { "title": "Inscription session de mars", "type": "registration", "dueAt": "2026-02-20T23:59:00Z" }
      ]
    },
    {
      "name": "Masters Test 2026",
      "year": 2026,
      "currency": "EUR",
      "tests": [
        { "test": "toefl", "weightPercent": 15, "minimumScore": 90 },
        { "test": "gmat", "weightPercent": 40, "recommendedScore": 650 }
      ],
      "schools": [
        {
          "name": "ESCP Business School",
          "city": "Paris",
          "country": "France",
          "campuses": ["Paris", "Berlin"],
          "programs": [
            {
              "name": "MSc in Business Analytics & AI",
              "slug": "escp-msc-business-analytics-ai",
              "type": "msc",
              "domain": "Business Analytics & AI",
              "format": "full_time",
              "campuses": ["Paris", "Berlin"],
              "courses": [
                { "title": "Machine Learning for Business" },
                { "title": "Data Analytics" }
              ],
              "deadlines": [
                { "title": "Dossier de candidature", "type": "registration", "dueAt": "2026-01-15T23:59:00Z", "sessionLabel": "Round 2" },
                { "title": "Entretien individuel", "type": "oral", "dueAt": "2025-12-01T10:00:00Z", "sessionLabel": "Round 1" }
              ]
            }
          ]
        },
        {
          "name": "HEC Paris",
          "city": "Jouy-en-Josas",
          "country": "France",
          "campuses": ["Jouy-en-Josas"],
          "programs": [
            {
              "name": "MBA",
              "slug": "hec-mba",
              "type": "mba",
              "domain": "MBA",
              "format": "full_time",
              "campuses": ["Jouy-en-Josas"],
              "deadlines": [
                { "title": "Round 3 application", "type": "registration", "dueAt": "2026-03-02T23:59:00Z" }
              ]
            }
          ]
        }
      ]
    }
  ],
  "leaderboards": [
    {
      "slug": "ft-european-business-schools-2025",
      "name": "FT European Business Schools 2025",
      "source": "Financial Times",
      "category": "European Business Schools",
      "region": "Europe",
      "year": 2025,
      "entries": [
        { "rank": 4, "schoolName": "ESCP Business School" },
        { "rank": 2, "schoolName": "HEC Paris" },
        { "rank": 9, "schoolName": "Unknown School" }
      ]
    }
  ]
}"#;

pub(crate) fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::default());
    CatalogSeed::from_json(CATALOG_FIXTURE)
        .expect("fixture parses")
        .apply(store.as_ref(), Utc::now())
        .expect("fixture applies");
    store
}
