//! Covariate/case-count correlation, grouped into display categories.

use crate::data::FeatureTable;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

struct Category {
    name: &'static str,
    /// (column, unit)
    features: &'static [(&'static str, &'static str)],
}

const CATEGORIES: &[Category] = &[
    Category {
        name: "Climate & Precipitation",
        features: &[
            ("precipitation", "mm"),
            ("spi3", ""),
            ("spi6", ""),
            ("precip_anomaly", "mm"),
            ("precipitation_7day", "mm"),
            ("precipitation_30day", "mm"),
        ],
    },
    Category {
        name: "Socioeconomic",
        features: &[
            ("pop_count_total", ""),
            ("pop_density_mean", "/km²"),
            ("avg_rad_mean", ""),
        ],
    },
    Category {
        name: "Temperature",
        features: &[
            ("tmin", "°C"),
            ("tmax", "°C"),
            ("tave", "°C"),
            ("temp_range", "°C"),
            ("tave_7day", "°C"),
            ("tave_30day", "°C"),
        ],
    },
    Category {
        name: "Air Quality",
        features: &[
            ("no2", "μg/m³"),
            ("co", "μg/m³"),
            ("so2", "μg/m³"),
            ("o3", "μg/m³"),
            ("pm10", "μg/m³"),
            ("pm25", "μg/m³"),
        ],
    },
    Category {
        name: "Vegetation",
        features: &[("ndvi", "")],
    },
    Category {
        name: "Sanitation & Water Access",
        features: &[
            ("drinking_water_count", ""),
            ("drinking_water_nearest", "m"),
            ("water_well_count", ""),
            ("water_well_nearest", "m"),
            ("toilet_count", ""),
            ("toilet_nearest", "m"),
            ("waste_basket_count", ""),
            ("waste_basket_nearest", "m"),
            ("wastewater_plant_count", ""),
            ("wastewater_plant_nearest", "m"),
        ],
    },
    Category {
        name: "Water Bodies",
        features: &[
            ("osm_wetland_nearest", "m"),
            ("osm_reservoir_nearest", "m"),
            ("osm_water_nearest", "m"),
            ("osm_riverbank_nearest", "m"),
            ("osm_river_nearest", "m"),
            ("osm_stream_nearest", "m"),
            ("osm_canal_nearest", "m"),
            ("osm_drain_nearest", "m"),
        ],
    },
    Category {
        name: "Healthcare Access",
        features: &[
            ("clinic_count", ""),
            ("clinic_nearest", "m"),
            ("hospital_count", ""),
            ("hospital_nearest", "m"),
            ("pharmacy_count", ""),
            ("pharmacy_nearest", "m"),
            ("doctors_count", ""),
            ("doctors_nearest", "m"),
        ],
    },
    Category {
        name: "Wealth Index",
        features: &[("rwi_mean", ""), ("rwi_median", ""), ("rwi_std", "")],
    },
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureFactor {
    pub name: String,
    pub raw_name: String,
    /// |Pearson r| with the case count, 0..=1
    pub impact: f64,
    pub impact_percentage: f64,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorCategory {
    pub name: String,
    pub features: Vec<FeatureFactor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureFactorsResponse {
    pub disease: String,
    pub categories: Vec<FactorCategory>,
}

/// Pearson r over the rows where both values are present. `None` when fewer
/// than two such rows exist or either side has zero variance.
pub fn pearson(xs: &[Option<f64>], ys: &[f64]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, &y)| x.map(|x| (x, y)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mx = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let my = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let (dx, dy) = (x - mx, y - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some(sxy / (sxx.sqrt() * syy.sqrt()))
}

/// `precipitation_7day` → `Precipitation 7Day`: underscores become spaces and
/// every letter that follows a non-letter is capitalized.
pub fn display_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut prev_alpha = false;
    for c in raw.chars() {
        let c = if c == '_' { ' ' } else { c };
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Absolute correlations of every covariate with the case count, grouped and
/// sorted strongest first. Covariates outside the known categories and empty
/// categories are left out.
pub fn feature_factors(disease: &str, table: &FeatureTable) -> FeatureFactorsResponse {
    let correlations: HashMap<&str, f64> = table
        .covariates()
        .iter()
        .filter_map(|c| pearson(&c.values, table.target()).map(|r| (c.name.as_str(), r.abs())))
        .collect();

    let categories = CATEGORIES
        .iter()
        .filter_map(|cat| {
            let mut features: Vec<FeatureFactor> = cat
                .features
                .iter()
                .filter_map(|(raw, unit)| {
                    correlations.get(raw).map(|&impact| FeatureFactor {
                        name: display_name(raw),
                        raw_name: raw.to_string(),
                        impact,
                        impact_percentage: impact * 100.0,
                        unit: unit.to_string(),
                    })
                })
                .collect();
            if features.is_empty() {
                return None;
            }
            features.sort_by(|a, b| b.impact.total_cmp(&a.impact));
            Some(FactorCategory {
                name: cat.name.to_string(),
                features,
            })
        })
        .collect();

    FeatureFactorsResponse {
        disease: disease.to_string(),
        categories,
    }
}
