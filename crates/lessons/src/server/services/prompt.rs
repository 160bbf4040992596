//! Prompt assembly for lesson generation

/// System message sent with every completion request
pub const SYSTEM_INSTRUCTION: &str = "Eres un experto en enseñanza del inglés como T.B. Harden.";

const ROLE_FRAMING: &str = "Actúa como un profesor de inglés que sigue la metodología de \
T.B. Harden. Diseña una clase completa, con objetivos, actividades y ejemplos, apoyándote en \
el contexto de la metodología cuando sea pertinente.";

const NO_CONTEXT: &str = "No hay contexto adicional disponible.";

/// Build the user prompt from the request message and retrieved passages
///
/// Passages keep their retrieval order. The message is embedded verbatim.
pub fn build_prompt(message: &str, context: &[String]) -> String {
  let mut prompt = String::with_capacity(
    ROLE_FRAMING.len() + message.len() + context.iter().map(|c| c.len() + 3).sum::<usize>() + 128,
  );

  prompt.push_str(ROLE_FRAMING);
  prompt.push_str("\n\nContexto de la metodología:\n");
  if context.is_empty() {
    prompt.push_str(NO_CONTEXT);
    prompt.push('\n');
  } else {
    for passage in context {
      prompt.push_str("- ");
      prompt.push_str(passage);
      prompt.push('\n');
    }
  }

  prompt.push_str("\nSolicitud del usuario:\n");
  prompt.push_str(message);
  prompt
}

#[cfg(test)]
mod tests {
  use super::*;

  fn passages(texts: &[&str]) -> Vec<String> {
    texts.iter().map(|t| t.to_string()).collect()
  }

  #[test]
  fn test_prompt_is_deterministic() {
    let context = passages(&["Uso de canciones", "Juegos de rol"]);
    assert_eq!(build_prompt("Clase A1", &context), build_prompt("Clase A1", &context));
  }

  #[test]
  fn test_passages_listed_in_order() {
    let prompt = build_prompt("Clase sobre saludos", &passages(&["primero", "segundo", "tercero"]));

    let first = prompt.find("- primero").unwrap();
    let second = prompt.find("- segundo").unwrap();
    let third = prompt.find("- tercero").unwrap();
    assert!(first < second && second < third);
    assert!(!prompt.contains(NO_CONTEXT));
  }

  #[test]
  fn test_empty_context_uses_placeholder() {
    let prompt = build_prompt("Clase sobre colores", &[]);
    assert!(prompt.contains("Contexto de la metodología:\nNo hay contexto adicional disponible."));
  }

  #[test]
  fn test_message_included_verbatim() {
    let message = "  Una clase de 45 minutos\nsobre el \"present perfect\" 😀  ";
    let prompt = build_prompt(message, &passages(&["ctx"]));
    assert!(prompt.ends_with(&format!("Solicitud del usuario:\n{message}")));
  }

  #[test]
  fn test_empty_message_still_builds_prompt() {
    let prompt = build_prompt("", &[]);
    assert!(prompt.starts_with(ROLE_FRAMING));
    assert!(prompt.ends_with("Solicitud del usuario:\n"));
  }
}
