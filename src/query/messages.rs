//! User-facing texts for not-found outcomes

use crate::entities::YearMonth;
use crate::format::locale::month_year_label;

/// The only text a data-access failure ever produces
pub const INTERNAL_ERROR: &str = "⚠️ Erro interno. Tente novamente.";

pub const SPECIFY_ITEM: &str = "❓ Especifique o item que deseja buscar";
pub const NO_ACTIVE_LOANS: &str = "✅ Nenhum empréstimo ativo no momento";
pub const NO_WATER_READINGS: &str = "💧 Nenhuma leitura de água encontrada";
pub const NO_MONTHLY_READINGS: &str = "💧 Nenhuma leitura de água registrada este mês";
pub const NO_CHECKLISTS: &str = "📋 Nenhum checklist cadastrado";
pub const NO_PENDING_INVOICES: &str = "✅ Nenhuma nota/boleto pendente";
pub const STOCK_OK: &str = "✅ Todos os itens com estoque adequado!";
pub const NO_OPEN_ORDERS: &str = "✅ Nenhuma OS pendente!";
pub const NO_RANKING: &str = "📊 Nenhum técnico com OS registradas";
pub const NO_PENDING_PURCHASES: &str = "✅ Nenhum pedido de compra pendente";
pub const EMPTY_FORUM: &str = "📋 Nenhum relatório no fórum ainda";

/// Invoices are registered through the action pipeline only
pub const CREATE_INVOICE_HINT: &str = "📝 Para registrar uma nota ou boleto, use o modo agente:\n\
*Icarus, nota [empresa] [valor] venc [data]*";

pub const UNKNOWN: &str = "❓ Não entendi sua pergunta.\n\
\n\
💡 *Dicas:*\n\
• Para consultas: _\"tem martelo?\"_, _\"OS pendentes\"_\n\
• Para ações: _\"Icarus, chegou 100 pregos\"_\n\
• Para ajuda: _\"ajuda\"_";

pub fn item_not_found(name: &str) -> String {
    format!("🔍 *{name}*: não encontrado no estoque")
}

pub fn technician_not_found(name: &str) -> String {
    format!("❓ Técnico *{name}* não encontrado")
}

pub fn forum_not_found(term: &str) -> String {
    format!("🔍 Nenhum relatório encontrado com *\"{term}\"*")
}

pub fn no_report_readings(month: YearMonth) -> String {
    format!(
        "💧 Nenhuma leitura de água registrada em {}",
        month_year_label(month.year, month.month)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_lists_tips() {
        assert!(UNKNOWN.starts_with("❓ Não entendi sua pergunta.\n\n💡 *Dicas:*\n"));
        assert!(UNKNOWN.ends_with("• Para ajuda: _\"ajuda\"_"));
    }

    #[test]
    fn test_parameterized_messages() {
        assert_eq!(item_not_found("martelo"), "🔍 *martelo*: não encontrado no estoque");
        assert_eq!(
            no_report_readings(YearMonth::new(2026, 1).unwrap()),
            "💧 Nenhuma leitura de água registrada em janeiro de 2026"
        );
    }
}
