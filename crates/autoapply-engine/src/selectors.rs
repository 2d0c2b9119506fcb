//! Portal locators as declarative configuration.
//!
//! Every site-specific literal the engine touches lives here, indexed by
//! logical step name, so flow logic stays free of markup details and a
//! portal change is a data edit. Controls the portal renders in more than
//! one way carry their alternates in order of preference.

use autoapply_browser::Locator;
use autoapply_models::StepName;

/// Portal-wide addresses and controls outside the step wizard.
#[derive(Debug, Clone)]
pub struct PortalProfile {
    /// Identifier the credential provider keys accounts by.
    pub portal_id: String,
    pub candidate_home_url: String,
    pub search_url: String,
    /// Path prefix of the first-party application wizard.
    pub application_base_path: String,
    /// Host of the third-party applicant tracking system jobs may redirect
    /// to. Such jobs cannot be driven and are skipped.
    pub external_host: String,

    pub sign_in_link: Locator,
    pub username_input: Locator,
    pub password_input: Locator,
    pub login_submit: Locator,
    pub go_to_search: Locator,

    pub keyword_input: Locator,
    pub location_input: Locator,
    pub search_submit: Locator,
    /// Raw selector for result-list job links; scraped wholesale rather
    /// than clicked.
    pub job_link_selector: String,

    pub start_application: Locator,
    pub apply_link: Locator,
}

impl Default for PortalProfile {
    fn default() -> Self {
        Self {
            portal_id: "england".to_string(),
            candidate_home_url: "https://www.jobs.nhs.uk/candidate".to_string(),
            search_url: "https://www.jobs.nhs.uk/candidate/search".to_string(),
            application_base_path: "/candidate/application".to_string(),
            external_host: "apps.trac.jobs".to_string(),

            sign_in_link: Locator::new("sign in link", "#candidate_sign_in"),
            username_input: Locator::new("username field", "#username"),
            password_input: Locator::new("password field", "#password"),
            login_submit: Locator::new("login submit", "#submit-button"),
            go_to_search: Locator::new("go to search link", "span.nhsuk-action-link__text"),

            keyword_input: Locator::new("keyword field", "#keyword"),
            location_input: Locator::new("location field", "#location"),
            search_submit: Locator::new("search button", "#search"),
            job_link_selector: "a[data-test=\"search-result-job-title\"]".to_string(),

            start_application: Locator::new(
                "start application button",
                "#save_continue[value=\"Start Application\"]",
            ),
            apply_link: Locator::new("apply link", "a[href*=\"application\"]"),
        }
    }
}

/// Locators for one logical wizard step. Roles a step does not have stay
/// `None`/empty.
#[derive(Debug, Clone)]
pub struct StepSelectors {
    /// Link into the step from the wizard's task list. Absence means the
    /// portal considers the step complete.
    pub task_link: Locator,
    /// Continue control on an intro page shown before the questions.
    pub intro_continue: Option<Locator>,
    /// Answer controls in question order.
    pub answers: Vec<Locator>,
    /// Free-text input, for steps that take pasted content.
    pub text_input: Option<Locator>,
    /// Final agreement checkbox, for the declaration.
    pub agreement: Option<Locator>,
    pub save_continue: Option<Locator>,
    /// Extra continue control some steps show after saving.
    pub exit_continue: Option<Locator>,
    /// Submission control, for the declaration.
    pub submit: Option<Locator>,
}

impl StepSelectors {
    fn entry(task_link: Locator) -> Self {
        Self {
            task_link,
            intro_continue: None,
            answers: Vec::new(),
            text_input: None,
            agreement: None,
            save_continue: None,
            exit_continue: None,
            submit: None,
        }
    }
}

fn save_continue() -> Locator {
    Locator::new("save and continue button", "#save_continue")
}

fn continue_control() -> Locator {
    Locator::with_fallbacks("continue control", ["#continue", "a#continue"])
}

/// The full step-name → locator mapping for the portal, with defaults for
/// the NHS England candidate wizard.
#[derive(Debug, Clone)]
pub struct SelectorRegistry {
    pub profile: PortalProfile,
    pub contact_details: StepSelectors,
    pub right_to_work: StepSelectors,
    pub cv_text: StepSelectors,
    pub safeguarding: StepSelectors,
    pub fitness_to_practice: StepSelectors,
    pub guaranteed_interview: StepSelectors,
    pub equality_diversity: StepSelectors,
    pub socio_economic: StepSelectors,
    pub declaration: StepSelectors,
}

impl SelectorRegistry {
    pub fn step(&self, name: StepName) -> &StepSelectors {
        match name {
            StepName::ContactDetails => &self.contact_details,
            StepName::RightToWork => &self.right_to_work,
            StepName::CvText => &self.cv_text,
            StepName::Safeguarding => &self.safeguarding,
            StepName::FitnessToPractice => &self.fitness_to_practice,
            StepName::GuaranteedInterview => &self.guaranteed_interview,
            StepName::EqualityDiversity => &self.equality_diversity,
            StepName::SocioEconomic => &self.socio_economic,
            StepName::Declaration => &self.declaration,
        }
    }
}

impl Default for SelectorRegistry {
    fn default() -> Self {
        Self {
            profile: PortalProfile::default(),

            contact_details: StepSelectors {
                answers: vec![Locator::new(
                    "email communication preference",
                    "#communication_preference_id_option_1",
                )],
                save_continue: Some(save_continue()),
                ..StepSelectors::entry(Locator::new(
                    "contact details task link",
                    "#contact_details_task_link",
                ))
            },

            right_to_work: StepSelectors {
                answers: vec![Locator::new(
                    "right to work yes option",
                    "#rtw_choice_id_option_1",
                )],
                save_continue: Some(save_continue()),
                exit_continue: Some(continue_control()),
                ..StepSelectors::entry(Locator::new(
                    "right to work task link",
                    "#right_to_work_task_link",
                ))
            },

            cv_text: StepSelectors {
                text_input: Some(Locator::new("cv textarea", "#cv")),
                save_continue: Some(save_continue()),
                exit_continue: Some(continue_control()),
                ..StepSelectors::entry(Locator::new("cv task link", "a[href*=\"/cv/input\"]"))
            },

            safeguarding: StepSelectors {
                intro_continue: Some(continue_control()),
                answers: vec![Locator::new(
                    "no convictions option",
                    "#convictions_id_option_2",
                )],
                save_continue: Some(save_continue()),
                exit_continue: Some(continue_control()),
                ..StepSelectors::entry(Locator::new(
                    "safeguarding task link",
                    "#safeguarding_task_link",
                ))
            },

            fitness_to_practice: StepSelectors {
                intro_continue: Some(continue_control()),
                // One locator, reused for each declaration the portal asks.
                answers: vec![Locator::new(
                    "fitness declaration no option",
                    "#answer_id_option_2",
                )],
                save_continue: Some(save_continue()),
                exit_continue: Some(continue_control()),
                ..StepSelectors::entry(Locator::new(
                    "fitness to practice task link",
                    "#fitness_to_practice_task_link",
                ))
            },

            guaranteed_interview: StepSelectors {
                answers: vec![
                    Locator::new(
                        "no physical limitation option",
                        "#physical_limitation_id_option_2",
                    ),
                    Locator::new(
                        "no armed forces veteran option",
                        "#armedForcesVeteran_id_option_2",
                    ),
                ],
                save_continue: Some(save_continue()),
                ..StepSelectors::entry(Locator::new(
                    "guaranteed interview task link",
                    "#gis_task_link",
                ))
            },

            equality_diversity: StepSelectors {
                answers: vec![
                    Locator::new("gender option", "#gender_choice_id_option_1"),
                    Locator::new("birth sex match option", "#gender_same_at_birth_id_option_1"),
                    Locator::new("marital status option", "#marital_status_id_option_2"),
                    Locator::new("pregnancy no option", "#pregnant_or_maternity_id_option_2"),
                    Locator::new(
                        "sexuality prefer not to say",
                        "#describe_sexuality_id_option_7",
                    ),
                    Locator::new("age range prefer not to say", "#age_range_id_option_7"),
                    Locator::new("ethnicity prefer not to say", "#ethnicity_id_option_18"),
                    Locator::new("religion prefer not to say", "#religion_id_option_11"),
                ],
                save_continue: Some(save_continue()),
                ..StepSelectors::entry(Locator::new(
                    "equality and diversity task link",
                    "#equality_and_diversity_task_link",
                ))
            },

            socio_economic: StepSelectors {
                intro_continue: Some(continue_control()),
                answers: vec![
                    Locator::new(
                        "household occupation prefer not to say",
                        "#mainHouseholdOccupation_option_10",
                    ),
                    Locator::new(
                        "school type prefer not to say",
                        "#attendedSchoolType_option_7",
                    ),
                    Locator::new(
                        "free school meals prefer not to say",
                        "#eligibleForFreeSchoolMeals_option_6",
                    ),
                ],
                save_continue: Some(save_continue()),
                ..StepSelectors::entry(Locator::new(
                    "socio-economic background task link",
                    "#socio_economic_background_task_link",
                ))
            },

            declaration: StepSelectors {
                agreement: Some(Locator::new(
                    "declaration agreement checkbox",
                    "#declaration_id",
                )),
                submit: Some(Locator::new("send application button", "#send_application")),
                ..StepSelectors::entry(Locator::new(
                    "declaration task link",
                    "#declaration_task_link",
                ))
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_step_has_a_task_link() {
        let registry = SelectorRegistry::default();
        for name in StepName::SEQUENCE {
            let selectors = registry.step(name);
            assert!(
                !selectors.task_link.alternates.is_empty(),
                "{name} is missing a task link"
            );
        }
    }

    #[test]
    fn declaration_carries_agreement_and_submit() {
        let registry = SelectorRegistry::default();
        let declaration = registry.step(StepName::Declaration);
        assert!(declaration.agreement.is_some());
        assert!(declaration.submit.is_some());
    }

    #[test]
    fn survey_batteries_are_ordered() {
        let registry = SelectorRegistry::default();
        assert_eq!(registry.step(StepName::EqualityDiversity).answers.len(), 8);
        assert_eq!(registry.step(StepName::SocioEconomic).answers.len(), 3);
        assert_eq!(registry.step(StepName::GuaranteedInterview).answers.len(), 2);
    }
}
