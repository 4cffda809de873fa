//! US states and the cities searched inside each of them.

/// State name paired with the cities searched in city-wise mode.
pub static US_CITIES_BY_STATE: &[(&str, &[&str])] = &[
    (
        "Alabama",
        &[
            "Birmingham", "Montgomery", "Mobile", "Huntsville", "Tuscaloosa", "Hoover",
            "Dothan", "Auburn", "Decatur", "Madison", "Florence", "Gadsden", "Vestavia Hills",
            "Prattville", "Phenix City",
        ],
    ),
    (
        "Alaska",
        &[
            "Anchorage", "Fairbanks", "Juneau", "Sitka", "Ketchikan", "Wasilla", "Kenai",
            "Kodiak", "Bethel", "Palmer", "Homer", "Barrow", "Unalaska", "Soldotna", "Valdez",
        ],
    ),
    (
        "Arizona",
        &[
            "Phoenix", "Tucson", "Mesa", "Chandler", "Scottsdale", "Glendale", "Gilbert",
            "Tempe", "Peoria", "Surprise", "Yuma", "Avondale", "Goodyear", "Flagstaff",
            "Buckeye",
        ],
    ),
    (
        "Arkansas",
        &[
            "Little Rock", "Fort Smith", "Fayetteville", "Springdale", "Jonesboro",
            "North Little Rock", "Conway", "Rogers", "Pine Bluff", "Bentonville", "Hot Springs",
            "Benton", "Sherwood", "Texarkana", "Cabot",
        ],
    ),
    (
        "California",
        &[
            "Los Angeles", "San Diego", "San Jose", "San Francisco", "Fresno", "Sacramento",
            "Long Beach", "Oakland", "Bakersfield", "Anaheim", "Santa Ana", "Riverside",
            "Stockton", "Irvine", "Chula Vista", "Fremont", "San Bernardino", "Modesto",
            "Fontana", "Oxnard",
        ],
    ),
    (
        "Colorado",
        &[
            "Denver", "Colorado Springs", "Aurora", "Fort Collins", "Lakewood", "Thornton",
            "Arvada", "Westminster", "Pueblo", "Centennial", "Boulder", "Greeley", "Longmont",
            "Loveland", "Grand Junction",
        ],
    ),
    (
        "Connecticut",
        &[
            "Bridgeport", "New Haven", "Hartford", "Stamford", "Waterbury", "Norwalk",
            "Danbury", "New Britain", "West Hartford", "Greenwich", "Hamden", "Meriden",
            "Bristol", "Manchester", "West Haven",
        ],
    ),
    (
        "Delaware",
        &[
            "Wilmington", "Dover", "Newark", "Middletown", "Smyrna", "Milford", "Seaford",
            "Georgetown", "Elsmere", "New Castle", "Bear", "Brookside", "Glasgow", "Hockessin",
            "Pike Creek",
        ],
    ),
    (
        "Florida",
        &[
            "Jacksonville", "Miami", "Tampa", "Orlando", "St. Petersburg", "Hialeah",
            "Tallahassee", "Fort Lauderdale", "Port St. Lucie", "Cape Coral", "Pembroke Pines",
            "Hollywood", "Gainesville", "Miramar", "Coral Springs", "Clearwater",
            "Miami Gardens", "Palm Bay", "West Palm Beach", "Pompano Beach",
        ],
    ),
    (
        "Georgia",
        &[
            "Atlanta", "Augusta", "Columbus", "Macon", "Savannah", "Athens", "Sandy Springs",
            "Roswell", "Johns Creek", "Albany", "Warner Robins", "Alpharetta", "Marietta",
            "Valdosta", "Smyrna",
        ],
    ),
    (
        "Hawaii",
        &[
            "Honolulu", "East Honolulu", "Pearl City", "Hilo", "Kailua", "Waipahu", "Kaneohe",
            "Mililani Town", "Kahului", "Ewa Gentry", "Kailua-Kona", "Kapaa", "Wahiawa",
            "Ewa Beach", "Royal Kunia",
        ],
    ),
    (
        "Idaho",
        &[
            "Boise", "Meridian", "Nampa", "Idaho Falls", "Pocatello", "Caldwell",
            "Coeur d'Alene", "Twin Falls", "Lewiston", "Post Falls", "Rexburg", "Eagle",
            "Chubbuck", "Mountain Home", "Kuna",
        ],
    ),
    (
        "Illinois",
        &[
            "Chicago", "Aurora", "Rockford", "Joliet", "Naperville", "Springfield", "Peoria",
            "Elgin", "Waukegan", "Cicero", "Champaign", "Bloomington", "Arlington Heights",
            "Evanston", "Decatur",
        ],
    ),
    (
        "Indiana",
        &[
            "Indianapolis", "Fort Wayne", "Evansville", "South Bend", "Carmel", "Fishers",
            "Bloomington", "Hammond", "Gary", "Muncie", "Lafayette", "Terre Haute", "Kokomo",
            "Anderson", "Noblesville",
        ],
    ),
    (
        "Iowa",
        &[
            "Des Moines", "Cedar Rapids", "Davenport", "Sioux City", "Waterloo", "Iowa City",
            "Council Bluffs", "Ames", "Dubuque", "West Des Moines", "Ankeny", "Urbandale",
            "Cedar Falls", "Marion", "Bettendorf",
        ],
    ),
    (
        "Kansas",
        &[
            "Wichita", "Overland Park", "Kansas City", "Topeka", "Olathe", "Lawrence",
            "Shawnee", "Salina", "Hutchinson", "Lenexa", "Manhattan", "Emporia", "Derby",
            "Garden City", "Dodge City",
        ],
    ),
    (
        "Kentucky",
        &[
            "Louisville", "Lexington", "Bowling Green", "Owensboro", "Covington", "Richmond",
            "Georgetown", "Florence", "Hopkinsville", "Nicholasville", "Elizabethtown",
            "Henderson", "Frankfort", "Jeffersontown", "Independence",
        ],
    ),
    (
        "Louisiana",
        &[
            "New Orleans", "Baton Rouge", "Shreveport", "Lafayette", "Lake Charles", "Kenner",
            "Bossier City", "Monroe", "Alexandria", "Houma", "Marrero", "Laplace", "Harvey",
            "Slidell", "Prairieville",
        ],
    ),
    (
        "Maine",
        &[
            "Portland", "Lewiston", "Bangor", "South Portland", "Auburn", "Biddeford",
            "Sanford", "Scarborough", "Saco", "Westbrook", "Augusta", "Waterville",
            "Presque Isle", "Gorham", "Windham",
        ],
    ),
    (
        "Maryland",
        &[
            "Baltimore", "Frederick", "Rockville", "Gaithersburg", "Bowie", "Hagerstown",
            "Annapolis", "College Park", "Salisbury", "Laurel", "Greenbelt", "Cumberland",
            "Westminster", "Hyattsville", "Takoma Park",
        ],
    ),
    (
        "Massachusetts",
        &[
            "Boston", "Worcester", "Springfield", "Lowell", "Cambridge", "New Bedford",
            "Brockton", "Quincy", "Lynn", "Fall River", "Newton", "Lawrence", "Somerville",
            "Framingham", "Haverhill",
        ],
    ),
    (
        "Michigan",
        &[
            "Detroit", "Grand Rapids", "Warren", "Sterling Heights", "Ann Arbor", "Lansing",
            "Flint", "Dearborn", "Livonia", "Westland", "Troy", "Farmington Hills", "Kalamazoo",
            "Wyoming", "Southfield",
        ],
    ),
    (
        "Minnesota",
        &[
            "Minneapolis", "Saint Paul", "Rochester", "Duluth", "Bloomington", "Brooklyn Park",
            "Plymouth", "St. Cloud", "Eagan", "Woodbury", "Maple Grove", "Eden Prairie",
            "Coon Rapids", "Burnsville", "Blaine",
        ],
    ),
    (
        "Mississippi",
        &[
            "Jackson", "Gulfport", "Southaven", "Hattiesburg", "Biloxi", "Meridian", "Tupelo",
            "Greenville", "Olive Branch", "Horn Lake", "Clinton", "Pearl", "Ridgeland",
            "Starkville", "Columbus",
        ],
    ),
    (
        "Missouri",
        &[
            "Kansas City", "St. Louis", "Springfield", "Columbia", "Independence",
            "Lee's Summit", "O'Fallon", "St. Joseph", "St. Charles", "St. Peters",
            "Blue Springs", "Florissant", "Joplin", "Chesterfield", "Jefferson City",
        ],
    ),
    (
        "Montana",
        &[
            "Billings", "Missoula", "Great Falls", "Bozeman", "Butte", "Helena", "Kalispell",
            "Havre", "Anaconda", "Miles City", "Belgrade", "Livingston", "Laurel", "Whitefish",
            "Lewistown",
        ],
    ),
    (
        "Nebraska",
        &[
            "Omaha", "Lincoln", "Bellevue", "Grand Island", "Kearney", "Fremont", "Hastings",
            "North Platte", "Norfolk", "Columbus", "Papillion", "La Vista", "Scottsbluff",
            "South Sioux City", "Beatrice",
        ],
    ),
    (
        "Nevada",
        &[
            "Las Vegas", "Henderson", "Reno", "North Las Vegas", "Sparks", "Carson City",
            "Fernley", "Elko", "Mesquite", "Boulder City", "Fallon", "Winnemucca",
            "West Wendover", "Ely", "Yerington",
        ],
    ),
    (
        "New Hampshire",
        &[
            "Manchester", "Nashua", "Concord", "Derry", "Rochester", "Salem", "Dover",
            "Merrimack", "Londonderry", "Hudson", "Keene", "Portsmouth", "Laconia", "Franklin",
            "Lebanon",
        ],
    ),
    (
        "New Jersey",
        &[
            "Newark", "Jersey City", "Paterson", "Elizabeth", "Edison", "Woodbridge",
            "Lakewood", "Toms River", "Hamilton", "Trenton", "Clifton", "Camden", "Brick",
            "East Orange", "Bayonne",
        ],
    ),
    (
        "New Mexico",
        &[
            "Albuquerque", "Las Cruces", "Rio Rancho", "Santa Fe", "Roswell", "Farmington",
            "Clovis", "Hobbs", "Alamogordo", "Carlsbad", "Gallup", "Deming", "Los Alamos",
            "Chaparral", "Sunland Park",
        ],
    ),
    (
        "New York",
        &[
            "New York City", "Buffalo", "Rochester", "Yonkers", "Syracuse", "Albany",
            "New Rochelle", "Mount Vernon", "Schenectady", "Utica", "White Plains", "Hempstead",
            "Troy", "Niagara Falls", "Binghamton",
        ],
    ),
    (
        "North Carolina",
        &[
            "Charlotte", "Raleigh", "Greensboro", "Durham", "Winston-Salem", "Fayetteville",
            "Cary", "Wilmington", "High Point", "Concord", "Asheville", "Gastonia",
            "Jacksonville", "Chapel Hill", "Rocky Mount",
        ],
    ),
    (
        "North Dakota",
        &[
            "Fargo", "Bismarck", "Grand Forks", "Minot", "West Fargo", "Williston", "Dickinson",
            "Mandan", "Jamestown", "Wahpeton", "Devils Lake", "Valley City", "Grafton",
            "Watford City", "Beulah",
        ],
    ),
    (
        "Ohio",
        &[
            "Columbus", "Cleveland", "Cincinnati", "Toledo", "Akron", "Dayton", "Parma",
            "Canton", "Youngstown", "Lorain", "Hamilton", "Springfield", "Kettering", "Elyria",
            "Lakewood",
        ],
    ),
    (
        "Oklahoma",
        &[
            "Oklahoma City", "Tulsa", "Norman", "Broken Arrow", "Lawton", "Edmond", "Moore",
            "Midwest City", "Enid", "Stillwater", "Muskogee", "Bartlesville", "Owasso",
            "Shawnee", "Ponca City",
        ],
    ),
    (
        "Oregon",
        &[
            "Portland", "Eugene", "Salem", "Gresham", "Hillsboro", "Bend", "Beaverton",
            "Medford", "Springfield", "Corvallis", "Albany", "Tigard", "Lake Oswego", "Keizer",
            "Grants Pass",
        ],
    ),
    (
        "Pennsylvania",
        &[
            "Philadelphia", "Pittsburgh", "Allentown", "Erie", "Reading", "Scranton",
            "Bethlehem", "Lancaster", "Harrisburg", "Altoona", "York", "State College",
            "Wilkes-Barre", "Chester", "Williamsport",
        ],
    ),
    (
        "Rhode Island",
        &[
            "Providence", "Warwick", "Cranston", "Pawtucket", "East Providence", "Woonsocket",
            "Newport", "Central Falls", "Westerly", "North Providence", "South Kingstown",
            "West Warwick", "Johnston", "North Kingstown", "Bristol",
        ],
    ),
    (
        "South Carolina",
        &[
            "Charleston", "Columbia", "North Charleston", "Mount Pleasant", "Rock Hill",
            "Greenville", "Summerville", "Sumter", "Goose Creek", "Hilton Head Island",
            "Florence", "Spartanburg", "Anderson", "Myrtle Beach", "Greer",
        ],
    ),
    (
        "South Dakota",
        &[
            "Sioux Falls", "Rapid City", "Aberdeen", "Brookings", "Watertown", "Mitchell",
            "Yankton", "Pierre", "Huron", "Vermillion", "Spearfish", "Brandon", "Box Elder",
            "Sturgis", "Belle Fourche",
        ],
    ),
    (
        "Tennessee",
        &[
            "Nashville", "Memphis", "Knoxville", "Chattanooga", "Clarksville", "Murfreesboro",
            "Jackson", "Johnson City", "Franklin", "Bartlett", "Hendersonville", "Kingsport",
            "Collierville", "Smyrna", "Cleveland",
        ],
    ),
    (
        "Texas",
        &[
            "Houston", "San Antonio", "Dallas", "Austin", "Fort Worth", "El Paso", "Arlington",
            "Corpus Christi", "Plano", "Laredo", "Lubbock", "Garland", "Irving", "Amarillo",
            "Grand Prairie", "Brownsville", "McKinney", "Frisco", "Pasadena", "Mesquite",
        ],
    ),
    (
        "Utah",
        &[
            "Salt Lake City", "West Valley City", "Provo", "West Jordan", "Orem", "Sandy",
            "Ogden", "St. George", "Layton", "Taylorsville", "Murray", "Bountiful", "Draper",
            "Riverton", "Roy",
        ],
    ),
    (
        "Vermont",
        &[
            "Burlington", "Essex", "South Burlington", "Colchester", "Rutland", "Bennington",
            "Brattleboro", "Milton", "Hartford", "Barre", "Montpelier", "Winooski",
            "St. Albans", "Newport", "Middlebury",
        ],
    ),
    (
        "Virginia",
        &[
            "Virginia Beach", "Norfolk", "Chesapeake", "Richmond", "Newport News", "Alexandria",
            "Hampton", "Portsmouth", "Suffolk", "Roanoke", "Lynchburg", "Harrisonburg",
            "Leesburg", "Charlottesville", "Danville",
        ],
    ),
    (
        "Washington",
        &[
            "Seattle", "Spokane", "Tacoma", "Vancouver", "Bellevue", "Kent", "Everett",
            "Renton", "Spokane Valley", "Federal Way", "Bellingham", "Yakima", "Kennewick",
            "Auburn", "Pasco",
        ],
    ),
    (
        "West Virginia",
        &[
            "Charleston", "Huntington", "Parkersburg", "Morgantown", "Wheeling", "Martinsburg",
            "Fairmont", "Beckley", "Clarksburg", "Lewisburg", "Hurricane", "South Charleston",
            "Teays Valley", "Bridgeport", "Charles Town",
        ],
    ),
    (
        "Wisconsin",
        &[
            "Milwaukee", "Madison", "Green Bay", "Kenosha", "Racine", "Appleton", "Waukesha",
            "Eau Claire", "Oshkosh", "Janesville", "West Allis", "La Crosse", "Sheboygan",
            "Wauwatosa", "Fond du Lac",
        ],
    ),
    (
        "Wyoming",
        &[
            "Cheyenne", "Casper", "Laramie", "Gillette", "Rock Springs", "Sheridan",
            "Green River", "Evanston", "Riverton", "Jackson", "Cody", "Rawlins", "Lander",
            "Torrington", "Powell",
        ],
    ),
];
