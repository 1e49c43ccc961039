//! Default configuration template
//!
//! Every sector resolves to at least this configuration. Only the display name
//! and the sector key vary between sectors.

use std::collections::BTreeMap;

use crate::config::sector_config::{
    BackendEndpoints, FieldDefinition, FieldKind, FieldSchema, SectorConfig, TestDictionary,
};
use crate::normalize::{normalize, NormalizedKey};

/// Lifecycle activities shared by every sector
pub const DEFAULT_ACTIVITIES: [&str; 5] = [
    "Preparação",
    "Execução",
    "Inspeção",
    "Retrabalho",
    "Finalização",
];

/// Builder for the generic sector configuration
pub struct DefaultConfigTemplate;

impl DefaultConfigTemplate {
    /// Default configuration for a sector, keyed by its normalized display name
    pub fn for_sector(display_name: &str) -> SectorConfig {
        Self::build(display_name, normalize(display_name))
    }

    /// Default configuration with an explicit key
    pub fn build(display_name: &str, sector_key: NormalizedKey) -> SectorConfig {
        SectorConfig {
            backend_endpoints: Self::endpoints(&sector_key),
            sector_key,
            display_name: display_name.to_string(),
            field_schema: Self::field_schema(),
            test_dictionary: Self::test_dictionary(),
            activity_list: DEFAULT_ACTIVITIES.iter().map(|a| a.to_string()).collect(),
        }
    }

    fn field_schema() -> FieldSchema {
        [
            ("numero_os", "Nº da OS", FieldKind::Text, true),
            ("cliente", "Cliente", FieldKind::Text, true),
            ("data", "Data", FieldKind::Date, true),
            ("hora_inicio", "Hora início", FieldKind::Time, true),
            ("hora_fim", "Hora fim", FieldKind::Time, false),
            ("operador", "Operador", FieldKind::Select, true),
            ("atividade", "Atividade", FieldKind::Select, true),
            ("retrabalho", "Retrabalho", FieldKind::Boolean, false),
            ("observacao", "Observação", FieldKind::Text, false),
        ]
        .into_iter()
        .map(|(name, label, kind, required)| {
            (name.to_string(), FieldDefinition::new(label, kind, required))
        })
        .collect()
    }

    fn test_dictionary() -> TestDictionary {
        let eletricos = [
            ("resistencia_isolamento", "Resistência de isolamento"),
            ("resistencia_ohmica", "Resistência ôhmica"),
            ("tensao_aplicada", "Tensão aplicada"),
            ("polaridade", "Polaridade"),
        ];
        let mecanicos = [
            ("vibracao", "Vibração"),
            ("temperatura_mancais", "Temperatura dos mancais"),
            ("balanceamento", "Balanceamento"),
        ];

        BTreeMap::from([
            ("eletricos".to_string(), to_map(&eletricos)),
            ("mecanicos".to_string(), to_map(&mecanicos)),
        ])
    }

    fn endpoints(sector_key: &NormalizedKey) -> BackendEndpoints {
        BackendEndpoints {
            apontamento: format!("/api/{sector_key}/apontamentos"),
            ordem_servico: format!("/api/{sector_key}/ordens-servico"),
        }
    }
}

fn to_map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(code, label)| (code.to_string(), label.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_shape() {
        let cfg = DefaultConfigTemplate::for_sector("Laboratório Elétrico");
        assert_eq!(cfg.sector_key.as_str(), "laboratorioeletrico");
        assert_eq!(cfg.display_name, "Laboratório Elétrico");
        assert_eq!(cfg.test_dictionary.len(), 2);
        assert_eq!(cfg.activity_list.len(), 5);
        assert_eq!(
            cfg.backend_endpoints.apontamento,
            "/api/laboratorioeletrico/apontamentos"
        );
    }

    #[test]
    fn test_template_is_deterministic() {
        assert_eq!(
            DefaultConfigTemplate::for_sector("Motores"),
            DefaultConfigTemplate::for_sector("Motores")
        );
    }
}
