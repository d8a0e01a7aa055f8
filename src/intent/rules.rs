//! Ordered intent rules
//!
//! Predicates overlap ("agua" appears in the report, consumption and reading
//! rules), so order is most-specific first and the first match wins.

use regex::Regex;
use std::sync::LazyLock;

use super::Intent;
use crate::session::triggers::EXIT_WORDS;

/// One `(predicate, intent)` entry of the rule table
#[derive(Debug)]
pub struct IntentRule {
    pub intent: Intent,
    pattern: Regex,
    /// Secondary predicate that upgrades the match to another intent
    refinement: Option<(Regex, Intent)>,
}

impl IntentRule {
    fn new(intent: Intent, pattern: &str) -> Self {
        Self {
            intent,
            pattern: Regex::new(pattern).unwrap(),
            refinement: None,
        }
    }

    fn refined(mut self, pattern: &str, intent: Intent) -> Self {
        self.refinement = Some((Regex::new(pattern).unwrap(), intent));
        self
    }

    /// Intent selected by this rule for normalized text, if it matches
    pub fn evaluate(&self, normalized: &str) -> Option<Intent> {
        if !self.pattern.is_match(normalized) {
            return None;
        }
        match &self.refinement {
            Some((refine, intent)) if refine.is_match(normalized) => Some(*intent),
            _ => Some(self.intent),
        }
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

static RULES: LazyLock<Vec<IntentRule>> = LazyLock::new(|| {
    vec![
        IntentRule::new(Intent::Exit, &format!(r"^({EXIT_WORDS})(\s|$|!|\?)")),
        IntentRule::new(
            Intent::Greeting,
            r"^(oi|ola|hey|eai|e ai|bom dia|boa tarde|boa noite|opa|fala|salve|hello|hi)(\s|$|!|\?)",
        ),
        IntentRule::new(
            Intent::Help,
            r"ajuda|help|menu|comandos|o que (voce|vc) faz|como funciona|opcoes",
        ),
        IntentRule::new(
            Intent::FindItem,
            r"tem\s|temos\s|existe\s|ha\s|possui|estoque de|quantidade de",
        ),
        IntentRule::new(
            Intent::CheckLoan,
            r"com quem|quem (esta|pegou|tem)|onde esta|emprestado|emprestimo|devolver",
        ),
        IntentRule::new(
            Intent::WaterHtmlReport,
            r"relatorio.*agua|manda.*relatorio.*agua|envia.*relatorio.*agua|gera.*relatorio.*agua",
        ),
        IntentRule::new(
            Intent::WaterMonthlyConsumption,
            r"consumo.*mes|consumo.*mensal|total.*agua.*mes|agua.*mes|gastou.*agua|quanto.*agua",
        ),
        IntentRule::new(Intent::WaterReading, r"agua|leitura|caixa.*agua|hidrometro"),
        IntentRule::new(
            Intent::ChecklistStatus,
            r"checklist|verificacao|rotina|automatico.*checklist|proxim.*checklist",
        ),
        IntentRule::new(
            Intent::ListInvoices,
            r"nota|boleto|vencimento|pagar|pendente.*pag|fatura",
        )
        .refined(
            r"registrar|lancar|criar|adicionar|colocar|por no sistema",
            Intent::CreateInvoice,
        ),
        IntentRule::new(
            Intent::LowStock,
            r"estoque baixo|faltando|acabando|repor|minimo",
        ),
        IntentRule::new(
            Intent::TechnicianStats,
            r"tecnico|funcionario|quantas os.*fez|quantas os.*ele|\bos (do|da|de) \w|destaque|ranking|quem (mais|fez)|desempenho",
        ),
        IntentRule::new(
            Intent::WorkOrders,
            r"\bos\s|ordem|servico|manutencao|pendente|aberto",
        ),
        IntentRule::new(Intent::Forum, r"forum|relatorio|recibo"),
        IntentRule::new(Intent::Diesel, r"diesel|combustivel|abastec"),
        IntentRule::new(Intent::Generator, r"gerador|energia|luz"),
        IntentRule::new(Intent::Purchases, r"compra|pedido|fornecedor|orcamento"),
    ]
});

/// The rule table, in evaluation order
pub fn rules() -> &'static [IntentRule] {
    &RULES
}
