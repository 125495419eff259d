//! Option lists offered to students at sign-up.
//!
//! The matcher treats every entry as an opaque string; only the intake
//! handlers consult the vocabulary to reject unknown values.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct College {
    pub name: String,
    pub departments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    pub study_spots: Vec<String>,
    pub study_times: Vec<String>,
    pub colleges: Vec<College>,
}

impl Vocabulary {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn college_names(&self) -> Vec<&str> {
        self.colleges.iter().map(|c| c.name.as_str()).collect()
    }

    /// Departments of `college`, or `None` if the college is unknown.
    pub fn departments_of(&self, college: &str) -> Option<&[String]> {
        self.colleges
            .iter()
            .find(|c| c.name == college)
            .map(|c| c.departments.as_slice())
    }

    pub fn has_department(&self, college: &str, department: &str) -> bool {
        self.departments_of(college)
            .is_some_and(|deps| deps.iter().any(|d| d == department))
    }

    pub fn has_spot(&self, spot: &str) -> bool {
        self.study_spots.iter().any(|s| s == spot)
    }

    pub fn has_time(&self, time: &str) -> bool {
        self.study_times.iter().any(|t| t == time)
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn college(name: &str, departments: &[&str]) -> College {
    College {
        name: name.to_string(),
        departments: owned(departments),
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            study_spots: owned(&[
                "Louisa Café",
                "Library",
                "XCB (小吃部)",
                "Moonlight Area",
                "In your dormitory room",
                "Education Building",
                "Starbucks (In front of the campus main gate)",
            ]),
            study_times: owned(&[
                "Early Morning (6-9 AM)",
                "Morning (9-12 PM)",
                "Afternoon (12-3 PM)",
                "Late Afternoon (3-6 PM)",
                "Evening (6-9 PM)",
                "Night (9-12 AM)",
                "Weekend Morning",
                "Weekend Evening",
            ]),
            colleges: vec![
                college(
                    "College of Science",
                    &[
                        "Department of Mathematics",
                        "Department of Physics",
                        "Department of Chemistry",
                        "Institute of Statistics",
                        "Institute of Astronomy",
                        "Interdisciplinary Program of Sciences",
                        "Institute of Computational and Modeling Science",
                    ],
                ),
                college(
                    "College of Engineering",
                    &[
                        "Department of Chemical Engineering",
                        "Department of Power Mechanical Engineering",
                        "Department of Materials Science and Engineering",
                        "Department of Industrial Engineering and Engineering Management",
                        "Institute / Program of Nanoengineering and Microsystems",
                        "Biomedical Engineering (institute / program)",
                        "Interdisciplinary Program of Engineering",
                        "Dual Master Program for Global Operation Management",
                    ],
                ),
                college(
                    "College of Nuclear Science",
                    &[
                        "Department of Engineering and System Science",
                        "Department of Biomedical Engineering and Environmental Science",
                        "Institute of Nuclear Engineering and Science",
                        "Institute of Analytical and Environmental Sciences",
                        "Interdisciplinary Program of Nuclear Science",
                        "International Ph.D. Program in Environmental Science and Technology (UST)",
                    ],
                ),
                college(
                    "College of Humanities and Social Sciences",
                    &[
                        "Department of Chinese Literature",
                        "Department of Foreign Languages and Literature",
                        "Institute of Philosophy",
                        "Institute of History",
                        "Institute of Anthropology",
                        "Institute of Sociology",
                        "Institute of Linguistics",
                        "Institute of Taiwan Literature",
                        "Graduate Program on Taiwan Studies",
                        "International Master's Program in Inter-Asia Cultural Studies (UST)",
                        "Master's Program in Chinese Language and Culture",
                        "Interdisciplinary Program of Humanities and Social Sciences",
                    ],
                ),
                college(
                    "College of Life Sciences and Medicine",
                    &[
                        "Department of Life Science",
                        "Department of Medical Science",
                        "Interdisciplinary Program of Life Sciences and Medicine",
                        "Institute of Molecular and Cellular Biology",
                        "Institute of Molecular Medicine",
                        "Institute of Bioinformatics and Structural Biology",
                        "Institute of Biotechnology",
                        "Institute of Systems Neuroscience",
                        "International Ph.D. Program in Interdisciplinary Neuroscience (UST)",
                        "Precision Medicine Ph.D. Program",
                    ],
                ),
                college(
                    "College of Electrical Engineering and Computer Science",
                    &[
                        "Department of Electrical Engineering",
                        "Department of Computer Science",
                        "Interdisciplinary Program of Electrical Engineering & Computer Science",
                        "Institute of Electronics Engineering",
                        "Institute of Communications Engineering",
                        "Institute of Information Systems and Applications",
                        "Institute of Photonics Technologies",
                        "International Ph.D. Program in Photonics (UST)",
                    ],
                ),
                college(
                    "College of Technology Management",
                    &[
                        "Department of Economics",
                        "Department of Quantitative Finance",
                        "Interdisciplinary Program of Management and Technology",
                        "Institute of Technology Management",
                        "Institute of Law for Science and Technology",
                        "Institute of Service Science",
                        "EMBA",
                        "EMBA Shenzhen",
                        "MBA",
                        "MFB",
                        "MPM",
                        "IMBA",
                    ],
                ),
                college(
                    "College of Education",
                    &[
                        "Department of Education and Learning Technology",
                        "Department of Early Childhood Education",
                        "Department of Special Education",
                        "Department of Educational Psychology and Counseling",
                        "Department of Kinesiology",
                        "Department of English Instruction",
                        "Department of Environmental and Cultural Resources",
                        "Interdisciplinary Program of Education",
                        "Institute of Taiwan Languages and Language Teaching",
                        "Graduate Institute of Mathematics and Science Education",
                        "Institute of Learning Sciences and Technologies",
                        "Center for English Education",
                    ],
                ),
                college(
                    "College of Arts",
                    &[
                        "Department of Music",
                        "Department of Arts and Design",
                        "Interdisciplinary Program of Technology and Art",
                    ],
                ),
                college(
                    "Taipei School of Economics and Political Science (TSE)",
                    &["Taipei School of Economics and Political Science"],
                ),
                college(
                    "College of Semiconductor Research",
                    &["College of Semiconductor Research"],
                ),
                college(
                    "Tsing Hua College",
                    &[
                        "Tsing Hua College (residential / interdisciplinary / liberal arts)",
                        "Tsing Hua Interdisciplinary Program",
                        "Tsing Hua College International Bachelor's Program",
                        "Residential College (within Tsing Hua College)",
                    ],
                ),
                college(
                    "Other Centers",
                    &[
                        "Center for General Education",
                        "Center for Teacher Education",
                        "Center for Language Education",
                        "Research Center for Technology and Art",
                        "Arts Center",
                        "Military Instructors' Office",
                        "Physical Education Office",
                    ],
                ),
            ],
        }
    }
}
