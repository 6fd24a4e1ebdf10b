//! Prompt templates for the care assistant.
//!
//! Every template that sees user history receives the bounded context digest,
//! never raw notes.

/// Used in place of an empty context digest.
pub const NO_CONTEXT: &str = "No recent logs available.";

pub fn chat_system(context: &str) -> String {
    let context = if context.trim().is_empty() {
        NO_CONTEXT
    } else {
        context
    };
    format!(
        "You are a supportive AI Care Assistant. You provide informational support ONLY.\n\
         CRITICAL SAFETY RULES:\n\
         1. NEVER diagnose. NEVER prescribe medication.\n\
         2. Use safe wording: \"may\", \"could\", \"consider\".\n\
         3. Keep responses EXTREMELY concise (max 25 words). No markdown.\n\
         4. RESPOND IN THE SAME LANGUAGE AS THE USER.\n\
         Structure every reply as:\n\
         A) Empathetic acknowledgement.\n\
         B) One pattern or suggestion.\n\
         C) One follow-up question.\n\n\
         Context:\n{}",
        context
    )
}

pub const SOAP_SYSTEM: &str = "You are an expert medical assistant. Format the dictation into a clean SOAP note.\n\
Strictly use this structure only:\n\
Subjective:\n- [details]\n\
Objective:\n- [details]\n\
Assessment:\n- [details]\n\
Plan:\n- [details]";

pub const INSIGHT_SYSTEM: &str = "You are a wellness AI. Give ONE short (15-word max), positive, non-medical insight about this journal entry. DO NOT diagnose. Sound empathetic. ALWAYS RESPOND IN THE SAME LANGUAGE AS THE USER.";

pub const INSIGHT_TEMPERATURE: f32 = 0.5;

pub fn copilot_system(transcript: &str) -> String {
    format!(
        "You are a clinical copilot listening to a doctor-patient consultation. Output two sections: 'Structured Notes' and 'Suggested Follow-up Questions for Patient'. Do NOT diagnose.\n\nTranscript:\n{}",
        transcript
    )
}

/// Summaries generated from the context digest alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Weekly,
    HealthTwin,
    MicroHabits,
    QuestionPrep,
    CareCircle,
    Monthly,
    DoctorPrep,
}

impl ReportKind {
    pub const ALL: [ReportKind; 7] = [
        Self::Weekly,
        Self::HealthTwin,
        Self::MicroHabits,
        Self::QuestionPrep,
        Self::CareCircle,
        Self::Monthly,
        Self::DoctorPrep,
    ];

    /// Whether the digest includes the last clinical note.
    pub fn includes_clinical(&self) -> bool {
        !matches!(self, Self::Weekly | Self::MicroHabits | Self::Monthly)
    }

    pub fn temperature(&self) -> f32 {
        match self {
            Self::HealthTwin | Self::MicroHabits => 0.4,
            Self::DoctorPrep => 0.2,
            _ => 0.3,
        }
    }

    fn instruction(&self) -> &'static str {
        match self {
            Self::Weekly => "Summarize the user's past 7 days based on the following logs. Keep it supportive, concise (under 50 words), and non-medical. NEVER diagnose. ALWAYS RESPOND IN THE SAME LANGUAGE AS THE USER.",
            Self::HealthTwin => "Analyze these logs and create a dynamic 'AI Health Twin Profile'. Summarize behavioral patterns, mood trends, and chronicity of symptoms. Keep it under 100 words, formatting with bullet points. NEVER diagnose. ALWAYS RESPOND IN THE SAME LANGUAGE AS THE USER.",
            Self::MicroHabits => "Based on the user's logs, suggest exactly 2 small, actionable 'Micro-Habits' they can do today to improve their specific documented challenges. Be very brief. ALWAYS RESPOND IN THE SAME LANGUAGE AS THE USER.",
            Self::QuestionPrep => "Draft 3 specific questions the patient should ask their doctor during their next visit, based on their unresolved or persistent symptoms in these logs.",
            Self::CareCircle => "Create a professional, structured 'Caregiver / Doctor Update Report' covering the last 7 days. Include: 1) Top Symptoms, 2) General Sentiment Trend, 3) Important Notes. Omit extreme emotional venting, focus on factual health trends.",
            Self::Monthly => "Provide a brief, encouraging high-level summary of the user's month based on these logs. Identify any broad recurring themes. Keep it under 60 words. Strict rule: NO medical advice or diagnosis.",
            Self::DoctorPrep => "Based on the following logs, prepare a short, bulleted list of 2-3 key points the user should discuss at their next doctor's appointment. Be informative, not diagnostic.",
        }
    }

    pub fn system_prompt(&self, context: &str) -> String {
        format!("{}\n\nLogs:\n{}", self.instruction(), context)
    }
}
