//! The analysis pass-through: serializes the current debt list into the
//! consultant prompt and forwards it to the model. Every failure degrades
//! to a fixed user-facing message; raw errors never reach the display.

use models::Debt;

use crate::gemini::TextModel;

/// Returned without calling the model when there is nothing to analyze.
pub const NO_DEBTS_MESSAGE: &str =
    "Você ainda não possui dívidas cadastradas. Comece adicionando uma para receber orientações.";

/// Returned when the model answers with no text.
pub const EMPTY_RESPONSE_MESSAGE: &str =
    "Não foi possível gerar uma análise no momento. Tente novamente mais tarde.";

/// Returned when the call itself fails (transport or API error).
pub const ANALYSIS_UNAVAILABLE_MESSAGE: &str =
    "Ops! Tivemos um problema ao conectar com nossa inteligência artificial. \
     Por favor, verifique se sua chave API está configurada.";

pub const SYSTEM_INSTRUCTION: &str =
    "Você é um consultor financeiro inteligente chamado 'DebtManager AI'. \
     Sua linguagem deve ser clara, profissional e encorajadora em português do Brasil.";

/// Builds the fixed prompt around one line per debt.
pub fn build_prompt(debts: &[Debt]) -> String {
    let debt_list = debts
        .iter()
        .map(format_debt_line)
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Como um consultor financeiro especialista, analise a seguinte lista de dívidas \
         de um usuário e forneça uma estratégia curta, direta e motivadora de 3 a 4 parágrafos.\n\
         Destaque qual dívida deve ser priorizada (bola de neve ou avalanche) e dê dicas \
         práticas de economia.\n\nLISTA DE DÍVIDAS:\n{debt_list}\n"
    )
}

fn format_debt_line(debt: &Debt) -> String {
    let due = debt
        .data_limite
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "Sem vencimento".to_string());

    format!(
        "- {} ({}): R$ {:.2}, Vencimento: {}",
        debt.descricao, debt.credor, debt.valor, due
    )
}

/// Runs the analysis over the cached debt list.
///
/// The returned text is displayed verbatim; it is either the model's answer
/// or one of the fixed fallback messages. Infallible by construction.
pub async fn analyze_debts(model: &dyn TextModel, debts: &[Debt]) -> String {
    if debts.is_empty() {
        return NO_DEBTS_MESSAGE.to_string();
    }

    let prompt = build_prompt(debts);
    match model.generate(SYSTEM_INSTRUCTION, &prompt).await {
        Ok(text) if text.trim().is_empty() => EMPTY_RESPONSE_MESSAGE.to_string(),
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(error = %err, "analysis request failed");
            ANALYSIS_UNAVAILABLE_MESSAGE.to_string()
        }
    }
}
