//! The standard sub-index catalog.
//!
//! Groups the source variables into six thematic sub-indices and carries
//! each sub-index's target PCA rank. The groupings and ranks follow the
//! published soft-power dataset this model was built for; callers are free
//! to supply their own rank table instead.

use canberra_index::PipelineConfig;
use canberra_panel::{SubIndexId, VariableId};
use std::collections::BTreeMap;

/// Definition of one thematic sub-index.
#[derive(Debug, Clone)]
pub struct SubIndexDef {
    /// Sub-index identifier.
    pub id: SubIndexId,
    /// Variables grouped under this sub-index.
    pub variables: Vec<VariableId>,
    /// Target PCA rank for weight estimation.
    pub target_rank: usize,
}

impl SubIndexDef {
    fn new(id: &str, variables: &[&str], target_rank: usize) -> Self {
        Self {
            id: id.into(),
            variables: variables.iter().map(|&v| v.into()).collect(),
            target_rank,
        }
    }
}

/// A catalog of sub-index definitions.
#[derive(Debug, Clone)]
pub struct Catalog {
    defs: Vec<SubIndexDef>,
}

impl Catalog {
    /// The standard six-sub-index catalog.
    pub fn standard() -> Self {
        Self {
            defs: vec![
                SubIndexDef::new("culture", &["int_tourists", "whc"], 3),
                SubIndexDef::new("digital", &["internet", "cellphones"], 2),
                SubIndexDef::new("education", &["ter_education", "publications"], 3),
                SubIndexDef::new("enterprise", &["trademarks"], 2),
                SubIndexDef::new(
                    "government",
                    &[
                        "rule_of_law",
                        "gov_stability",
                        "dem_account",
                        "bur_effect",
                        "corruption",
                    ],
                    3,
                ),
                SubIndexDef::new("engagement", &["aid", "refugees"], 2),
            ],
        }
    }

    /// All sub-index definitions.
    pub fn sub_indices(&self) -> &[SubIndexDef] {
        &self.defs
    }

    /// Look up a sub-index definition by id.
    pub fn get(&self, id: &SubIndexId) -> Option<&SubIndexDef> {
        self.defs.iter().find(|def| &def.id == id)
    }

    /// The sub-index a variable belongs to, if any.
    pub fn sub_index_of(&self, variable: &VariableId) -> Option<&SubIndexId> {
        self.defs
            .iter()
            .find(|def| def.variables.contains(variable))
            .map(|def| &def.id)
    }

    /// The rank table, with each rank clamped to its sub-index's variable
    /// count (the estimator rejects a rank above the number of variables).
    pub fn ranks(&self) -> BTreeMap<SubIndexId, usize> {
        self.defs
            .iter()
            .map(|def| {
                (
                    def.id.clone(),
                    def.target_rank.min(def.variables.len()).max(1),
                )
            })
            .collect()
    }

    /// A pipeline configuration with the catalog's ranks and the default
    /// sparsification threshold.
    pub fn default_config(&self) -> PipelineConfig {
        PipelineConfig::with_ranks(self.ranks())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_shape() {
        let catalog = Catalog::standard();
        assert_eq!(catalog.sub_indices().len(), 6);

        let government = catalog.get(&"government".into()).unwrap();
        assert_eq!(government.variables.len(), 5);
        assert_eq!(government.target_rank, 3);
    }

    #[test]
    fn test_variable_lookup() {
        let catalog = Catalog::standard();
        assert_eq!(
            catalog.sub_index_of(&"rule_of_law".into()),
            Some(&SubIndexId::from("government"))
        );
        assert_eq!(catalog.sub_index_of(&"not_a_variable".into()), None);
    }

    #[test]
    fn test_ranks_clamped_to_variable_count() {
        let catalog = Catalog::standard();
        let ranks = catalog.ranks();

        // culture asks for rank 3 but has two variables
        assert_eq!(ranks[&SubIndexId::from("culture")], 2);
        // enterprise has a single variable
        assert_eq!(ranks[&SubIndexId::from("enterprise")], 1);
        // government keeps its configured rank
        assert_eq!(ranks[&SubIndexId::from("government")], 3);

        for def in catalog.sub_indices() {
            assert!(ranks[&def.id] <= def.variables.len());
            assert!(ranks[&def.id] >= 1);
        }
    }

    #[test]
    fn test_default_config_covers_all_sub_indices() {
        let catalog = Catalog::standard();
        let config = catalog.default_config();
        assert_eq!(config.ranks.len(), catalog.sub_indices().len());
    }
}
