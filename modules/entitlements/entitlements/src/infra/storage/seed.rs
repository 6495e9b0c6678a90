//! Default module catalog shipped with the platform.

use entitlements_sdk::NewModule;
use rust_decimal::Decimal;

struct CatalogEntry {
    code: &'static str,
    name: &'static str,
    description: &'static str,
    category: &'static str,
    icon: &'static str,
}

const DEFAULT_CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        code: "facturation",
        name: "Facturation",
        description: "Module de gestion des factures : création, suivi, paiement, relance",
        category: "sales",
        icon: "receipt",
    },
    CatalogEntry {
        code: "articles",
        name: "Codes Articles",
        description: "Module de gestion du catalogue articles : création, modification, suppression",
        category: "sales",
        icon: "package",
    },
    CatalogEntry {
        code: "bons_commande",
        name: "Bons de Commande",
        description: "Module de gestion des bons de commande : création, validation, conversion en facture",
        category: "sales",
        icon: "clipboard-list",
    },
    CatalogEntry {
        code: "devis",
        name: "Devis",
        description: "Module de gestion des devis : création, envoi, acceptation, conversion en facture",
        category: "sales",
        icon: "file-text",
    },
    CatalogEntry {
        code: "avoirs",
        name: "Avoirs",
        description: "Module de gestion des avoirs : création, validation, annulation",
        category: "sales",
        icon: "file-minus",
    },
    CatalogEntry {
        code: "proformas",
        name: "Proformas",
        description: "Module de gestion des factures proforma : création, envoi, acceptation, conversion en facture",
        category: "sales",
        icon: "file-check",
    },
    CatalogEntry {
        code: "logs",
        name: "Logs",
        description: "Module de consultation des logs et événements système",
        category: "system",
        icon: "scroll-text",
    },
    CatalogEntry {
        code: "notifications",
        name: "Notifications",
        description: "Module de gestion des notifications : création, lecture, suppression",
        category: "system",
        icon: "bell",
    },
    CatalogEntry {
        code: "agent_telephonique",
        name: "Agent Téléphonique IA",
        description: "Module Agent IA : appels entrants/sortants, SMS, questionnaires, configuration Twilio",
        category: "telephony",
        icon: "phone",
    },
    CatalogEntry {
        code: "clients",
        name: "Clients",
        description: "Module de gestion des clients : création, consultation, modification, suppression",
        category: "crm",
        icon: "users",
    },
    CatalogEntry {
        code: "leads",
        name: "Leads",
        description: "Module de gestion des leads : création, suivi, qualification, conversion",
        category: "crm",
        icon: "target",
    },
    CatalogEntry {
        code: "comptabilite",
        name: "Comptabilité PCG",
        description: "Module comptabilité complète : écritures, grand livre, balance, bilan, TVA, agent IA comptable",
        category: "accounting",
        icon: "calculator",
    },
];

/// The platform's default modules, in display order.
pub fn default_catalog() -> Vec<NewModule> {
    DEFAULT_CATALOG
        .iter()
        .zip(0..)
        .map(|(e, order)| NewModule {
            code: e.code.to_owned(),
            display_name: e.name.to_owned(),
            description: Some(e.description.to_owned()),
            category: Some(e.category.to_owned()),
            icon: Some(e.icon.to_owned()),
            price_per_month: Decimal::ZERO,
            display_order: order,
            active: true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn codes_are_unique_and_ordered() {
        let catalog = default_catalog();
        let codes: HashSet<_> = catalog.iter().map(|m| m.code.as_str()).collect();
        assert_eq!(codes.len(), catalog.len());
        assert_eq!(catalog.len(), 12);
        assert!(catalog.windows(2).all(|w| w[0].display_order < w[1].display_order));
    }

    #[test]
    fn every_entry_passes_module_validation() {
        for m in default_catalog() {
            assert!(
                crate::domain::validation::validate_new_module(&m).is_ok(),
                "{} should be valid",
                m.code
            );
        }
    }
}
