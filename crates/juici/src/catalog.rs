//! Static agent catalog and canned reply templates served by the mock service
use indoc::indoc;

use crate::models::agent::{AgentDescriptor, AgentProfile};

struct CatalogEntry {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    example_prompts: &'static [&'static str],
}

const AGENTS: &[CatalogEntry] = &[
    CatalogEntry {
        id: "digital_transform_analyst",
        name: "Digital Transform Analyst",
        description: "Analyzes your digital transformation needs",
        example_prompts: &[
            "Analyze our current customer service processes for automation opportunities",
            "Assess our digital maturity and identify key gaps",
            "Evaluate our e-commerce workflow and recommend improvements",
        ],
    },
    CatalogEntry {
        id: "digital_transform_architect",
        name: "Digital Transform Architect",
        description: "Designs your digital transformation strategy",
        example_prompts: &[
            "Design a cloud migration strategy for our legacy systems",
            "Create a technical roadmap for implementing AI-powered analytics",
            "Plan a microservices architecture for our monolithic application",
        ],
    },
    CatalogEntry {
        id: "digital_transform_automator",
        name: "Digital Transform Automator",
        description: "Automates processes for digital transformation",
        example_prompts: &[
            "Automate our invoice processing workflow",
            "Create API integrations between our CRM and ERP systems",
            "Implement automated testing for our deployment pipeline",
        ],
    },
    CatalogEntry {
        id: "digital_transform_designer",
        name: "Digital Transform Designer",
        description: "Creates designs for your digital interfaces",
        example_prompts: &[
            "Design a user-friendly interface for our new workflow automation system",
            "Create a mobile-first design for our customer portal",
            "Develop an accessible UI for our employee dashboard",
        ],
    },
    CatalogEntry {
        id: "digital_transform_trainer",
        name: "Digital Transform Trainer",
        description: "Trains your team on digital transformation",
        example_prompts: &[
            "Create a training program for our new digital workflow",
            "Develop documentation for our automated systems",
            "Design learning paths for different user roles",
        ],
    },
    CatalogEntry {
        id: "digital_transform_measurer",
        name: "Digital Transform Measurer",
        description: "Measures the impact of digital transformation",
        example_prompts: &[
            "Set up KPIs for our digital transformation initiative",
            "Track ROI metrics for our automation project",
            "Measure user adoption and satisfaction rates",
        ],
    },
    CatalogEntry {
        id: "blogsmith",
        name: "BlogSmith",
        description: "Creates engaging blog content",
        example_prompts: &[],
    },
    CatalogEntry {
        id: "contractcopilot",
        name: "ContractCopilot",
        description: "Assists with contract analysis and creation",
        example_prompts: &[],
    },
    CatalogEntry {
        id: "fitcoachai",
        name: "FitCoachAI",
        description: "Your personal AI fitness coach",
        example_prompts: &[],
    },
    CatalogEntry {
        id: "funnelbot",
        name: "FunnelBot",
        description: "Optimizes your marketing funnels",
        example_prompts: &[],
    },
];

impl CatalogEntry {
    fn descriptor(&self) -> AgentDescriptor {
        AgentDescriptor {
            id: self.id.to_string(),
            name: self.name.to_string(),
            description: self.description.to_string(),
        }
    }
}

/// Every agent, in listing order
pub fn agents() -> Vec<AgentDescriptor> {
    AGENTS.iter().map(CatalogEntry::descriptor).collect()
}

pub fn profile(id: &str) -> Option<AgentProfile> {
    AGENTS.iter().find(|entry| entry.id == id).map(|entry| AgentProfile {
        descriptor: entry.descriptor(),
        example_prompts: entry
            .example_prompts
            .iter()
            .map(|prompt| prompt.to_string())
            .collect(),
    })
}

/// Keys with a dedicated chat template
const TEMPLATE_KEYS: &[&str] = &["digital_transform_analyst", "content_creator", "data_analyst"];

fn dedicated_template(key: &str, message: &str) -> String {
    match key {
        "digital_transform_analyst" => format!(
            "As a Digital Transform Analyst, I can help with your query: \"{}\". \n\nDigital transformation involves integrating digital technology into all areas of your business. I recommend starting with a thorough assessment of your current digital capabilities and creating a roadmap for implementation.",
            message
        ),
        "content_creator" => format!(
            "Thanks for your message: \"{}\". \n\nAs your Content Creator, I can develop engaging content tailored to your target audience. Let's start by defining your content goals and the platforms you want to focus on.",
            message
        ),
        "data_analyst" => format!(
            "Regarding your question: \"{}\". \n\nAs a Data Analyst, I recommend we begin by identifying the key metrics and data sources relevant to your objectives. This will allow us to create meaningful visualizations and extract actionable insights.",
            message
        ),
        _ => fallback_template(message),
    }
}

/// Generic reply used for agents without a dedicated template
pub fn fallback_template(message: &str) -> String {
    format!(
        "Thank you for your message: \"{}\". \n\nI'm processing your request and will assist you shortly.",
        message
    )
}

/// Render the chat reply for `agent_name`
///
/// The key is matched exactly first and then ignoring ASCII case; anything else gets the
/// fallback template. Every template echoes the user's message.
pub fn chat_reply(agent_name: &str, message: &str) -> String {
    let key = TEMPLATE_KEYS
        .iter()
        .find(|key| **key == agent_name)
        .or_else(|| {
            TEMPLATE_KEYS
                .iter()
                .find(|key| key.eq_ignore_ascii_case(agent_name))
        });

    match key {
        Some(key) => dedicated_template(key, message),
        None => fallback_template(message),
    }
}

/// Canned Markdown analysis returned for every uploaded image
pub const UPLOAD_ANALYSIS: &str = indoc! {"
    # Chart Analysis

    This appears to be a chart image. Here's my analysis:

    ## Key Observations:
    - The chart shows a clear trend in the data
    - There are notable patterns that indicate important business insights
    - The visualization effectively communicates the intended data relationships

    ## Insights:
    1. The data shows important correlations between key metrics
    2. The overall trend suggests positive growth in the measured variables
    3. There are some outliers that warrant further investigation

    ## Recommendations:
    - Consider adding more data points to strengthen the analysis
    - Use a logarithmic scale for better visualization of the full data range
    - Add annotations to highlight key inflection points

    *This is a demonstration response generated by the mock analysis service.*"};
