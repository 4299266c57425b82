//! System and research prompt construction
//!
//! Prompt selection is a lookup table keyed on the research domain; every
//! provider shares the same structured-output request so their free-text
//! responses parse uniformly.

use crate::types::ResearchDomain;

/// Build the domain-specific system prompt
pub fn system_prompt(domain: ResearchDomain) -> String {
    let domain_instructions = match domain {
        ResearchDomain::Sports => {
            "You are a sports research expert. Provide accurate, up-to-date information about:\n\
             - Game scores and statistics\n\
             - Player performances and records\n\
             - Team standings and rankings\n\
             - Sports news and analysis\n\n\
             Focus on facts and verifiable data."
        }
        ResearchDomain::Finance => {
            "You are a financial research analyst. Provide informed insights about:\n\
             - Market trends and stock performance\n\
             - Economic indicators and forecasts\n\
             - Investment opportunities and risks\n\
             - Financial news and analysis\n\n\
             Always mention that this is for informational purposes, not financial advice."
        }
        ResearchDomain::Shopping => {
            "You are a product research specialist. Help users make informed purchasing \
             decisions by providing:\n\
             - Product comparisons and reviews\n\
             - Price trends and value analysis\n\
             - Feature breakdowns\n\
             - Pros and cons of different options\n\n\
             Be objective and highlight both positives and negatives."
        }
        ResearchDomain::Healthcare => {
            "You are a health information researcher. Provide evidence-based information about:\n\
             - General health topics and wellness\n\
             - Treatment options and approaches\n\
             - Medical research summaries\n\
             - Health trends and recommendations\n\n\
             ALWAYS emphasize that this is educational information, not medical advice.\n\
             Recommend consulting healthcare professionals for personal medical decisions."
        }
    };

    format!(
        "{domain_instructions}\n\n\
         Research Guidelines:\n\
         1. Be concise but thorough\n\
         2. Focus on the most relevant and recent information\n\
         3. Provide 3-5 key points as takeaways\n\
         4. Rate your confidence level honestly\n\
         5. If you're uncertain, say so"
    )
}

/// Build the user prompt requesting labeled sections the parser understands
pub fn research_prompt(query: &str) -> String {
    format!(
        "{query}\n\n\
         Please provide a comprehensive research response with the following structure:\n\n\
         1. ANSWER: A clear, detailed answer to the query (2-4 sentences)\n\n\
         2. KEY POINTS: List 3-5 main takeaways as bullet points\n\n\
         3. CONFIDENCE: Rate your confidence as one of: low, medium, high, very_high\n\n\
         4. SOURCES (optional): If you can reference specific sources, list them\n\n\
         Format your response clearly with these sections labeled."
    )
}
