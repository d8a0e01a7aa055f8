//! Fixed reply blocks

/// Appended to every found reply except the fixed blocks below
pub const CLOSING_PROMPT: &str = "\n\n💬 _Posso ajudar com mais alguma coisa?_";

pub const GREETING: &str = "🦅 *Olá! Sou o ICARUS*\n\
\n\
Seu assistente de gestão.\n\
Posso consultar estoque, OS, notas, água, diesel e muito mais!\n\
\n\
Digite *ajuda* para ver os comandos disponíveis.";

pub const HELP: &str = "🦅 *ICARUS - COMANDOS*\n\
\n\
━━━━━━━━━━━━━━━━━━━━━━\n\
\n\
📦 *Estoque:*\n\
• _\"tem martelo?\"_ → busca item\n\
• _\"estoque baixo\"_ → itens em falta\n\
• _\"com quem está o X?\"_ → empréstimos\n\
\n\
🔧 *Manutenção:*\n\
• _\"OS pendentes\"_ → ordens abertas\n\
• _\"técnico destaque\"_ → ranking\n\
• _\"OS do Bruno hoje\"_ → estatísticas\n\
\n\
💧 *Água:* _\"leitura água hoje\"_\n\
⛽ *Diesel:* _\"quanto diesel?\"_\n\
🛒 *Compras:* _\"pedidos de compra\"_\n\
\n\
━━━━━━━━━━━━━━━━━━━━━━\n\
\n\
💰 *Notas e Boletos:*\n\
• _\"boletos pendentes\"_ → lista\n\
• _\"nota GYN Service\"_ → detalhes + arquivos\n\
\n\
📋 *Fórum/Relatórios:*\n\
• _\"forum\"_ → lista relatórios\n\
• _\"forum recibo dimas\"_ → detalhes";

pub const FAREWELL: &str = "👋 *Até logo!*\n\
\n\
Modo agente desativado.\n\
Para ativar novamente, digite:\n\
*Icarus* + seu comando";

/// Reply when the action pipeline fails or times out
pub const ACTION_FAILED: &str = "⚠️ Erro interno. Tente novamente.";

/// Reply when no action backend is configured
pub const ACTION_UNAVAILABLE: &str = "⚠️ Modo agente indisponível no momento.\n\
\n\
Você ainda pode fazer consultas, por exemplo: _\"tem martelo?\"_";

pub const INVOICE_DETAIL_HINT: &str = "\n\n💡 _Para ver detalhes, digite:_\n_\"nota [nome da empresa]\"_";

pub const FORUM_DETAIL_HINT: &str = "\n\n💡 _Para ver detalhes, digite:_\n_\"forum [nome do relatório]\"_";

/// Horizontal rule of `width` heavy box characters
pub fn rule(width: usize) -> String {
    "━".repeat(width)
}

/// Bold title line followed by a rule line
pub fn header(title: &str, width: usize) -> String {
    format!("{title}\n{}\n", rule(width))
}
