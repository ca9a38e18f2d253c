//! Prompt construction from product descriptors
//!
//! Prompts are derived strings, rebuilt per request. Construction is
//! deterministic for a given descriptor: attributes are emitted in key
//! order, and empty or null attributes never appear.

use crate::models::ProductDescriptor;

const FORMAT_INSTRUCTION: &str = " Just tell me the estimated numerical value in the \"X kg CO2e\" format, without any explanation. If there is a range then give me the average.";

const TIPS_INSTRUCTION: &str =
    " Provide practical tips in about 200 words, keeping them concise but informative.";

const GENERIC_TIPS_PROMPT: &str = "How to reduce my carbon footprint? Provide practical tips in about 200 words, keeping them concise but informative.";

/// Build the estimation prompt for a validated product name
pub fn estimation_prompt(product_name: &str, descriptor: &ProductDescriptor) -> String {
    let mut prompt = format!(
        "Give me an estimate of the carbon footprint of my {}.",
        product_name
    );
    push_additional_info(&mut prompt, descriptor);
    prompt.push_str(FORMAT_INSTRUCTION);
    prompt
}

/// Build the reduction-tips prompt.
///
/// Falls back to a generic prompt when no descriptor is given or the
/// descriptor carries no usable product name.
pub fn reduction_prompt(descriptor: Option<&ProductDescriptor>) -> String {
    let Some((descriptor, product_name)) =
        descriptor.and_then(|d| d.trimmed_product_name().map(|name| (d, name)))
    else {
        return GENERIC_TIPS_PROMPT.to_string();
    };

    let mut prompt = format!(
        "How to reduce the carbon footprint from my {}?",
        product_name
    );
    push_additional_info(&mut prompt, descriptor);
    prompt.push_str(TIPS_INSTRUCTION);
    prompt
}

/// Append the `"key: value"` attribute clause, underscores in keys replaced
/// by spaces. Descriptors with no populated attributes add nothing.
fn push_additional_info(prompt: &mut String, descriptor: &ProductDescriptor) {
    let additional_info = descriptor
        .populated_attributes()
        .map(|(key, value)| format!("{}: {}", key.replace('_', " "), value))
        .collect::<Vec<_>>()
        .join(", ");

    if !additional_info.is_empty() {
        prompt.push_str(&format!(
            " These are all the information I can provide: {}.",
            additional_info
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_only_descriptor_has_no_info_clause() {
        let descriptor = ProductDescriptor::named("laptop");
        let prompt = estimation_prompt("laptop", &descriptor);

        assert_eq!(
            prompt,
            "Give me an estimate of the carbon footprint of my laptop. Just tell me the estimated numerical value in the \"X kg CO2e\" format, without any explanation. If there is a range then give me the average."
        );
    }

    #[test]
    fn test_populated_attributes_appear_with_spaced_keys() {
        let descriptor = ProductDescriptor::named("laptop")
            .with_attribute("weight", "2kg")
            .with_attribute("material_type", "aluminum");
        let prompt = estimation_prompt("laptop", &descriptor);

        assert!(prompt.contains("These are all the information I can provide:"));
        assert!(prompt.contains("material type: aluminum"));
        assert!(prompt.contains("weight: 2kg"));
    }

    #[test]
    fn test_empty_and_null_attributes_are_omitted() {
        let mut descriptor = ProductDescriptor::named("laptop").with_attribute("weight", "2kg");
        descriptor.attributes.insert("category".to_string(), None);
        descriptor
            .attributes
            .insert("lifespan".to_string(), Some(String::new()));

        let prompt = estimation_prompt("laptop", &descriptor);

        assert!(prompt.contains("weight: 2kg"));
        assert!(!prompt.contains("category"));
        assert!(!prompt.contains("lifespan"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let descriptor = ProductDescriptor::named("laptop")
            .with_attribute("weight", "2kg")
            .with_attribute("category", "electronics");

        assert_eq!(
            estimation_prompt("laptop", &descriptor),
            estimation_prompt("laptop", &descriptor)
        );
    }

    #[test]
    fn test_reduction_prompt_generic_without_descriptor() {
        assert_eq!(reduction_prompt(None), GENERIC_TIPS_PROMPT);
    }

    #[test]
    fn test_reduction_prompt_generic_without_product_name() {
        let descriptor = ProductDescriptor {
            product_name: Some("  ".to_string()),
            ..ProductDescriptor::default()
        };
        assert_eq!(reduction_prompt(Some(&descriptor)), GENERIC_TIPS_PROMPT);
    }

    #[test]
    fn test_reduction_prompt_uses_product_name_and_attributes() {
        let descriptor = ProductDescriptor::named("laptop").with_attribute("lifespan", "5 years");
        let prompt = reduction_prompt(Some(&descriptor));

        assert!(prompt.starts_with("How to reduce the carbon footprint from my laptop?"));
        assert!(prompt.contains("lifespan: 5 years"));
        assert!(prompt.ends_with(TIPS_INSTRUCTION));
    }
}
